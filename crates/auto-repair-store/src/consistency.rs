/// Consistency levels the persisted-table contract is specified against.
/// Not enforced by this crate's in-memory implementation — a real
/// implementation backed by a quorum store is expected to honor these on
/// every call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsistencyLevel {
    One,
    LocalQuorum,
    /// Lightweight-transaction consistency for the insert-if-absent CAS.
    LocalSerial,
}

/// `LOCAL_QUORUM` when replication is topology-aware, else `ONE`.
pub fn read_write_consistency(topology_aware: bool) -> ConsistencyLevel {
    if topology_aware {
        ConsistencyLevel::LocalQuorum
    } else {
        ConsistencyLevel::One
    }
}
