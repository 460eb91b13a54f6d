use std::collections::HashSet;

use auto_repair_sdk::{EpochMillis, HostId};
use serde::{Deserialize, Serialize};

/// Serialized form of the last-persisted turn decision, stored alongside a
/// history row so a crashed-and-resumed node re-announces the same banner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersistedTurn {
    MyTurn,
    MyTurnDueToPriority,
    MyTurnForceRepair,
}

/// One row of `auto_repair_history`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepairHistory {
    pub host_id: HostId,
    pub last_repair_start_ts: EpochMillis,
    pub last_repair_finish_ts: EpochMillis,
    pub repair_turn: Option<PersistedTurn>,
    pub delete_hosts: HashSet<HostId>,
    pub delete_hosts_update_ts: EpochMillis,
    pub force_repair: bool,
}

impl RepairHistory {
    pub fn new(host_id: HostId, now: EpochMillis) -> Self {
        Self {
            host_id,
            last_repair_start_ts: now,
            last_repair_finish_ts: now,
            repair_turn: None,
            delete_hosts: HashSet::new(),
            delete_hosts_update_ts: 0,
            force_repair: false,
        }
    }

    /// A row is considered running iff its start timestamp is strictly
    /// ahead of its finish timestamp.
    pub fn is_running(&self) -> bool {
        self.last_repair_start_ts > self.last_repair_finish_ts
    }
}
