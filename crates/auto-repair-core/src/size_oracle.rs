use auto_repair_sdk::{RepairType, TokenRange};

use crate::error::AutoRepairResult;

/// `{repairType, keyspace, table, range, partitions, sizeInRange, totalSize}`,
/// with a derived `size_for_repair`: incremental repair must consider the
/// whole table's unrepaired data because anticompaction rewrites whole
/// SSTables; full repair only considers the portion overlapping the range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeEstimate {
    pub repair_type: RepairType,
    pub range: TokenRange,
    pub partitions: u64,
    pub size_in_range: u64,
    pub total_size: u64,
}

impl SizeEstimate {
    pub fn size_for_repair(&self) -> u64 {
        match self.repair_type {
            RepairType::Incremental => self.total_size,
            _ => self.size_in_range,
        }
    }
}

/// Estimates bytes and partition counts for a (keyspace, table, range).
/// Specified only through this interface: the actual SSTable/storage-unit
/// walk and HyperLogLog-class cardinality merge are storage-engine
/// collaborators out of scope here.
pub trait SizeOracle: Send + Sync {
    fn estimate(
        &self,
        repair_type: RepairType,
        keyspace: &str,
        table: &str,
        range: TokenRange,
    ) -> AutoRepairResult<SizeEstimate>;

    /// Bytes currently sitting in the in-memory write buffer for this
    /// table — used as the zero-size fallback.
    fn write_buffer_bytes(&self, keyspace: &str, table: &str) -> AutoRepairResult<u64>;

    /// `true` if the table could not be located; callers must check this
    /// before calling `estimate`/`write_buffer_bytes` for a table that
    /// might have been concurrently dropped.
    fn table_exists(&self, keyspace: &str, table: &str) -> bool;

    /// A single on-disk size figure used only to order tables ascending
    /// before keyspace batching; independent of any one range, unlike
    /// `estimate`.
    fn table_size_hint(&self, keyspace: &str, table: &str) -> AutoRepairResult<u64>;
}
