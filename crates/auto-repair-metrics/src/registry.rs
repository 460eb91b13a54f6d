use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;

use crate::histogram::Histogram;

/// Per-`RepairType` counters, keyed by the type's string name so this crate
/// does not need to depend on `auto-repair-core`'s `RepairType` enum.
#[derive(Default)]
pub struct RepairTypeCounters {
    pub cycle_starts: AtomicU64,
    pub cycle_finishes: AtomicU64,
    pub repair_delayed_by_schedule: AtomicU64,
    pub repair_delayed_by_replica: AtomicU64,
    pub assignments_skipped_by_budget: AtomicU64,
    pub stuck_peer_repairs_observed: AtomicU64,
    pub repair_start_lag: Histogram,
}

impl RepairTypeCounters {
    pub fn incr_cycle_starts(&self) {
        self.cycle_starts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_cycle_finishes(&self) {
        self.cycle_finishes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_repair_delayed_by_schedule(&self) {
        self.repair_delayed_by_schedule.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_repair_delayed_by_replica(&self) {
        self.repair_delayed_by_replica.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_assignments_skipped_by_budget(&self, count: u64) {
        self.assignments_skipped_by_budget
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_start_lag_millis(&self, lag_millis: i64) {
        self.repair_start_lag.record(lag_millis);
    }

    /// A peer's running history row has exceeded `auto_repair_table_max_repair_time`.
    /// A peer cannot unilaterally declare another node's repair abandoned
    /// (no interface for that besides the delete-hosts quorum), so this is
    /// metrics-only — an operator signal that a node may be wedged.
    pub fn incr_stuck_peer_repair(&self) {
        self.stuck_peer_repairs_observed.fetch_add(1, Ordering::Relaxed);
    }
}

/// The process-wide metrics registry, one `RepairTypeCounters` per repair
/// type name, created lazily on first use.
#[derive(Default)]
pub struct MetricsRegistry {
    by_type: RwLock<HashMap<String, Arc<RepairTypeCounters>>>,
}

impl MetricsRegistry {
    pub fn for_type(&self, repair_type: &str) -> Arc<RepairTypeCounters> {
        if let Some(counters) = self.by_type.read().get(repair_type) {
            return counters.clone();
        }
        let mut by_type = self.by_type.write();
        by_type
            .entry(repair_type.to_string())
            .or_insert_with(|| Arc::new(RepairTypeCounters::default()))
            .clone()
    }
}

lazy_static! {
    /// The shared registry instance. Explicit dependency injection is
    /// preferred everywhere in this workspace; this singleton exists only
    /// because metrics registries are the one place every mainstream Rust
    /// metrics crate (and `solana_metrics`, via its own `lazy_static`
    /// sender) treats as genuinely process-global rather than
    /// caller-supplied.
    pub static ref METRICS: MetricsRegistry = MetricsRegistry::default();
}
