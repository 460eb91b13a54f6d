use std::collections::HashSet;

use auto_repair_sdk::{EpochMillis, HostId, RepairType};

use crate::error::StoreResult;
use crate::model::{PersistedTurn, RepairHistory};

/// The replicated key-value/row store's contract, as a trait so the
/// arbitrator and splitter can be exercised against an in-memory double
/// without a real quorum store.
pub trait PersistedStateStore: Send + Sync {
    /// Quorum read of every history row for `repair_type`.
    fn select_history(&self, repair_type: RepairType) -> StoreResult<Vec<RepairHistory>>;

    /// CAS insert-if-not-exists. Returns `true` if this call created the
    /// row, `false` if a row already existed (in which case the existing
    /// row is left untouched). `force_repair` seeds the row's
    /// `force_repair` column, used when a freshly-joined node should run
    /// its first cycle over non-primary ranges too (`force_repair_new_node`).
    fn insert_history_if_absent(
        &self,
        repair_type: RepairType,
        host_id: HostId,
        start: EpochMillis,
        finish: EpochMillis,
        force_repair: bool,
    ) -> StoreResult<bool>;

    /// Idempotent start write. Overwrites `last_repair_start_ts` and the
    /// persisted turn banner for this node's own row.
    fn update_start(
        &self,
        repair_type: RepairType,
        host_id: HostId,
        ts: EpochMillis,
        turn: PersistedTurn,
    ) -> StoreResult<()>;

    /// Idempotent finish write. Also clears `force_repair`. Must
    /// preserve the monotonicity invariant on `last_repair_finish_ts`:
    /// implementations must not let `ts` move the column backward.
    fn update_finish(&self, repair_type: RepairType, host_id: HostId, ts: EpochMillis) -> StoreResult<()>;

    /// Appends `voter_host_id` to the row's `delete_hosts` set (set-union,
    /// commutative).
    fn add_delete_vote(
        &self,
        repair_type: RepairType,
        host_id: HostId,
        voter_host_id: HostId,
        now: EpochMillis,
    ) -> StoreResult<()>;

    /// Atomic set-to-empty of `delete_hosts`.
    fn clear_delete_votes(&self, repair_type: RepairType, host_id: HostId) -> StoreResult<()>;

    /// Row delete.
    fn delete_history(&self, repair_type: RepairType, host_id: HostId) -> StoreResult<()>;

    fn select_priorities(&self, repair_type: RepairType) -> StoreResult<HashSet<HostId>>;

    fn add_priority(&self, repair_type: RepairType, host_ids: &[HostId]) -> StoreResult<()>;

    fn remove_priority(&self, repair_type: RepairType, host_id: HostId) -> StoreResult<()>;
}
