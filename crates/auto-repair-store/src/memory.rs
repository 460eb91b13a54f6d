use std::collections::{HashMap, HashSet};

use auto_repair_sdk::{EpochMillis, HostId, RepairType};
use parking_lot::RwLock;

use crate::error::StoreResult;
use crate::model::{PersistedTurn, RepairHistory};
use crate::store::PersistedStateStore;

#[derive(Default)]
struct Tables {
    history: HashMap<RepairType, HashMap<HostId, RepairHistory>>,
    priorities: HashMap<RepairType, HashSet<HostId>>,
}

/// A single-process, in-memory `PersistedStateStore`.
///
/// Used by this workspace's own tests and suitable as the store a
/// single-node integration harness runs against; not a substitute for a
/// real quorum-replicated backend, which is why every method here is
/// infallible in practice but still returns `StoreResult` to keep the
/// trait honest about what a networked implementation must handle.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistedStateStore for InMemoryStore {
    fn select_history(&self, repair_type: RepairType) -> StoreResult<Vec<RepairHistory>> {
        let tables = self.tables.read();
        Ok(tables
            .history
            .get(&repair_type)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }

    fn insert_history_if_absent(
        &self,
        repair_type: RepairType,
        host_id: HostId,
        start: EpochMillis,
        finish: EpochMillis,
        force_repair: bool,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let rows = tables.history.entry(repair_type).or_default();
        if rows.contains_key(&host_id) {
            return Ok(false);
        }
        let mut row = RepairHistory::new(host_id, start);
        row.last_repair_start_ts = start;
        row.last_repair_finish_ts = finish;
        row.force_repair = force_repair;
        rows.insert(host_id, row);
        Ok(true)
    }

    fn update_start(
        &self,
        repair_type: RepairType,
        host_id: HostId,
        ts: EpochMillis,
        turn: PersistedTurn,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let rows = tables.history.entry(repair_type).or_default();
        let row = rows
            .entry(host_id)
            .or_insert_with(|| RepairHistory::new(host_id, ts));
        row.last_repair_start_ts = ts;
        row.repair_turn = Some(turn);
        Ok(())
    }

    fn update_finish(&self, repair_type: RepairType, host_id: HostId, ts: EpochMillis) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let rows = tables.history.entry(repair_type).or_default();
        let row = rows
            .entry(host_id)
            .or_insert_with(|| RepairHistory::new(host_id, ts));
        // Monotonicity invariant: never move finish backward.
        if ts > row.last_repair_finish_ts {
            row.last_repair_finish_ts = ts;
        }
        row.force_repair = false;
        Ok(())
    }

    fn add_delete_vote(
        &self,
        repair_type: RepairType,
        host_id: HostId,
        voter_host_id: HostId,
        now: EpochMillis,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if let Some(row) = tables
            .history
            .get_mut(&repair_type)
            .and_then(|rows| rows.get_mut(&host_id))
        {
            if row.delete_hosts.insert(voter_host_id) {
                row.delete_hosts_update_ts = now;
            }
        }
        Ok(())
    }

    fn clear_delete_votes(&self, repair_type: RepairType, host_id: HostId) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if let Some(row) = tables
            .history
            .get_mut(&repair_type)
            .and_then(|rows| rows.get_mut(&host_id))
        {
            row.delete_hosts.clear();
        }
        Ok(())
    }

    fn delete_history(&self, repair_type: RepairType, host_id: HostId) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if let Some(rows) = tables.history.get_mut(&repair_type) {
            rows.remove(&host_id);
        }
        Ok(())
    }

    fn select_priorities(&self, repair_type: RepairType) -> StoreResult<HashSet<HostId>> {
        let tables = self.tables.read();
        Ok(tables
            .priorities
            .get(&repair_type)
            .cloned()
            .unwrap_or_default())
    }

    fn add_priority(&self, repair_type: RepairType, host_ids: &[HostId]) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let set = tables.priorities.entry(repair_type).or_default();
        for host_id in host_ids {
            set.insert(*host_id);
        }
        Ok(())
    }

    fn remove_priority(&self, repair_type: RepairType, host_id: HostId) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if let Some(set) = tables.priorities.get_mut(&repair_type) {
            set.remove(&host_id);
        }
        Ok(())
    }
}
