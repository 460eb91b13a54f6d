use std::collections::HashSet;
use std::time::Duration;

use crate::error::{AutoRepairError, AutoRepairResult};

/// Byte counts throughout this crate are plain `u64`s (bytes); GiB figures
/// are just large u64s built from this constant.
pub const GIB: u64 = 1 << 30;

/// Either a finite byte budget or "unlimited" (FULL and PREVIEW_REPAIRED
/// default to unlimited; INCREMENTAL defaults to a finite figure).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteBudget {
    Unlimited,
    Bytes(u64),
}

impl ByteBudget {
    pub fn admits(&self, bytes_so_far: u64, additional: u64) -> bool {
        match self {
            ByteBudget::Unlimited => true,
            ByteBudget::Bytes(limit) => bytes_so_far.saturating_add(additional) <= *limit,
        }
    }

    pub fn is_exhausted(&self, bytes_so_far: u64) -> bool {
        match self {
            ByteBudget::Unlimited => false,
            ByteBudget::Bytes(limit) => bytes_so_far >= *limit,
        }
    }

    pub fn as_bytes(&self) -> Option<u64> {
        match self {
            ByteBudget::Unlimited => None,
            ByteBudget::Bytes(b) => Some(*b),
        }
    }
}

/// Splitter tunables.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitterConfig {
    pub bytes_per_assignment: u64,
    pub partitions_per_assignment: u64,
    pub max_tables_per_assignment: usize,
    pub max_bytes_per_schedule: ByteBudget,
}

impl SplitterConfig {
    pub fn validate(&self) -> AutoRepairResult<()> {
        if self.bytes_per_assignment == 0 {
            return Err(AutoRepairError::Configuration(
                "bytes_per_assignment must be > 0".to_string(),
            ));
        }
        if self.partitions_per_assignment == 0 {
            return Err(AutoRepairError::Configuration(
                "partitions_per_assignment must be > 0".to_string(),
            ));
        }
        if let ByteBudget::Bytes(limit) = self.max_bytes_per_schedule {
            if self.bytes_per_assignment > limit {
                return Err(AutoRepairError::Configuration(format!(
                    "bytes_per_assignment ({}) must be <= max_bytes_per_schedule ({})",
                    self.bytes_per_assignment, limit
                )));
            }
        }
        Ok(())
    }
}

fn default_splitter_config(max_bytes_per_schedule: ByteBudget) -> SplitterConfig {
    SplitterConfig {
        bytes_per_assignment: 50 * GIB,
        partitions_per_assignment: 1 << 20,
        max_tables_per_assignment: 64,
        max_bytes_per_schedule,
    }
}

/// Per-`RepairType` tunables.
#[derive(Clone, Debug)]
pub struct RepairConfig {
    pub enabled: bool,
    pub repair_by_keyspace: bool,
    pub allow_parallel_replica_repair: bool,
    pub allow_parallel_replica_repair_across_schedules: bool,
    pub parallel_repair_count: u32,
    pub parallel_repair_percentage: u8,
    pub ignore_dcs: HashSet<String>,
    pub force_repair_new_node: bool,
    pub materialized_view_repair_enabled: bool,
    pub auto_repair_table_max_repair_time: Duration,
    pub clear_delete_hosts_buffer: Duration,
    pub splitter: SplitterConfig,
}

impl RepairConfig {
    pub fn validate(&self) -> AutoRepairResult<()> {
        if self.parallel_repair_percentage > 100 {
            return Err(AutoRepairError::Configuration(format!(
                "parallel_repair_percentage must be within 0..=100, got {}",
                self.parallel_repair_percentage
            )));
        }
        self.splitter.validate()
    }

    /// `max(1, max(parallelRepairCount, ceil(|histories| * percentage / 100)))`.
    pub fn parallel_limit(&self, history_count: usize) -> usize {
        let by_percentage =
            ((history_count as u64 * self.parallel_repair_percentage as u64) + 99) / 100;
        (self.parallel_repair_count as usize)
            .max(by_percentage as usize)
            .max(1)
    }
}

pub fn default_full_config() -> RepairConfig {
    RepairConfig {
        enabled: true,
        repair_by_keyspace: true,
        allow_parallel_replica_repair: false,
        allow_parallel_replica_repair_across_schedules: false,
        parallel_repair_count: 1,
        parallel_repair_percentage: 0,
        ignore_dcs: HashSet::new(),
        force_repair_new_node: false,
        materialized_view_repair_enabled: false,
        auto_repair_table_max_repair_time: Duration::from_secs(6 * 3600),
        clear_delete_hosts_buffer: Duration::from_secs(3600),
        splitter: default_splitter_config(ByteBudget::Unlimited),
    }
}

pub fn default_incremental_config() -> RepairConfig {
    RepairConfig {
        splitter: default_splitter_config(ByteBudget::Bytes(100 * GIB)),
        ..default_full_config()
    }
}

pub fn default_preview_repaired_config() -> RepairConfig {
    default_full_config()
}
