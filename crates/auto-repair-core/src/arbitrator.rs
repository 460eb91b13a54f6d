use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use auto_repair_gossip::{ring_hosts, ReplicationStrategy, ReplicationTopology, RingView};
use auto_repair_metrics::MetricsRegistry;
use auto_repair_retry::{Retry, RetrySpec};
use auto_repair_sdk::{Clock, EpochMillis, HostId, RepairType};
use auto_repair_store::{PersistedStateStore, PersistedTurn, RepairHistory, StoreError, StoreResult};
use itertools::Itertools;

use crate::config::RepairConfig;
use crate::error::AutoRepairResult;

/// The outcome of one `turn_for` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnDecision {
    MyTurn,
    MyTurnDueToPriority,
    MyTurnForceRepair,
    NotMyTurn,
}

impl TurnDecision {
    pub fn is_my_turn(&self) -> bool {
        !matches!(self, TurnDecision::NotMyTurn)
    }

    fn to_persisted(self) -> PersistedTurn {
        match self {
            TurnDecision::MyTurn | TurnDecision::NotMyTurn => PersistedTurn::MyTurn,
            TurnDecision::MyTurnDueToPriority => PersistedTurn::MyTurnDueToPriority,
            TurnDecision::MyTurnForceRepair => PersistedTurn::MyTurnForceRepair,
        }
    }

    fn from_persisted(turn: Option<PersistedTurn>) -> Self {
        match turn {
            None => TurnDecision::MyTurn,
            Some(PersistedTurn::MyTurn) => TurnDecision::MyTurn,
            Some(PersistedTurn::MyTurnDueToPriority) => TurnDecision::MyTurnDueToPriority,
            Some(PersistedTurn::MyTurnForceRepair) => TurnDecision::MyTurnForceRepair,
        }
    }
}

/// Decides, without a leader, which subset of live nodes may concurrently
/// run repair. A pure function of (ring snapshot, history snapshot,
/// priority snapshot, config, clock) except for the idempotent store
/// writes it performs along the way (inserts, vote casts, deletes) —
/// every dependency is injected, no hidden statics.
pub struct TurnArbitrator {
    store: Arc<dyn PersistedStateStore>,
    ring_view: Arc<dyn RingView>,
    topology: Arc<dyn ReplicationTopology>,
    clock: Arc<dyn Clock>,
    metrics: Arc<MetricsRegistry>,
    configs: HashMap<RepairType, RepairConfig>,
    /// Keyspaces considered when checking replica-overlap busy-ness,
    /// each mapped to its replication strategy.
    keyspace_strategies: HashMap<String, ReplicationStrategy>,
    /// Backoff applied to the state-mutating sub-steps (vote cast,
    /// insert-if-absent, delete, start/finish writes) per §5; bounded by
    /// `call_timeout` so a wedged store can't stall a whole tick.
    retry_spec: RetrySpec,
    call_timeout: Duration,
}

impl TurnArbitrator {
    pub fn new(
        store: Arc<dyn PersistedStateStore>,
        ring_view: Arc<dyn RingView>,
        topology: Arc<dyn ReplicationTopology>,
        clock: Arc<dyn Clock>,
        metrics: Arc<MetricsRegistry>,
        configs: HashMap<RepairType, RepairConfig>,
        keyspace_strategies: HashMap<String, ReplicationStrategy>,
    ) -> Self {
        Self::with_retry_spec(
            store,
            ring_view,
            topology,
            clock,
            metrics,
            configs,
            keyspace_strategies,
            RetrySpec::default(),
        )
    }

    /// As `new`, but with an explicit backoff spec for the state-mutating
    /// store calls instead of `RetrySpec::default()`.
    pub fn with_retry_spec(
        store: Arc<dyn PersistedStateStore>,
        ring_view: Arc<dyn RingView>,
        topology: Arc<dyn ReplicationTopology>,
        clock: Arc<dyn Clock>,
        metrics: Arc<MetricsRegistry>,
        configs: HashMap<RepairType, RepairConfig>,
        keyspace_strategies: HashMap<String, ReplicationStrategy>,
        retry_spec: RetrySpec,
    ) -> Self {
        Self {
            store,
            ring_view,
            topology,
            clock,
            metrics,
            configs,
            keyspace_strategies,
            retry_spec,
            call_timeout: Duration::from_secs(5),
        }
    }

    /// Retries a state-mutating store call against `self.retry_spec` until
    /// it succeeds, hits a non-transient error, or the retry budget (a
    /// `retries=` cap and/or `call_timeout`) is spent. Reads are
    /// deliberately not routed through this: per §4.4, a failed snapshot
    /// read simply fails the whole tick to `NOT_MY_TURN` and the next tick
    /// retries from scratch.
    fn with_retry<T>(&self, mut op: impl FnMut() -> StoreResult<T>) -> AutoRepairResult<T> {
        let retry = Retry::until_elapsed(self.retry_spec.strategy(), self.call_timeout);
        let retry = match self.retry_spec.retries {
            Some(max) => retry.with_max_attempts(max),
            None => retry,
        };
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err @ StoreError::Transient(_)) => {
                    if !retry.maybe_sleep() {
                        return Err(err.into());
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Public contract: decides whether it is this node's turn to run
    /// `repair_type`. Any failure along the way collapses to
    /// `NOT_MY_TURN` and is logged — the next tick retries from scratch.
    pub fn turn_for(&self, repair_type: RepairType, my_host_id: HostId) -> TurnDecision {
        match self.try_turn_for(repair_type, my_host_id) {
            Ok(decision) => decision,
            Err(err) => {
                log::warn!(
                    "turn_for({:?}, {}) failed, yielding NOT_MY_TURN: {}",
                    repair_type,
                    my_host_id,
                    err
                );
                TurnDecision::NotMyTurn
            }
        }
    }

    fn config(&self, repair_type: RepairType) -> &RepairConfig {
        self.configs
            .get(&repair_type)
            .expect("every RepairType must have a config entry")
    }

    fn try_turn_for(&self, repair_type: RepairType, my_host_id: HostId) -> AutoRepairResult<TurnDecision> {
        let config = self.config(repair_type);
        let now = self.clock.now_millis();

        // Step 1: snapshot ring and histories.
        let ring = ring_hosts(self.ring_view.as_ref(), &config.ignore_dcs);
        let ring_set: HashSet<HostId> = ring.iter().copied().collect();
        let histories = self.store.select_history(repair_type)?;

        // Step 2: reconcile rows against ring membership.
        let clear_buffer_millis = config.clear_delete_hosts_buffer.as_millis() as i64;
        for h in &histories {
            if !h.delete_hosts.is_empty() && now - h.delete_hosts_update_ts > clear_buffer_millis {
                self.with_retry(|| self.store.clear_delete_votes(repair_type, h.host_id))?;
            } else if !ring_set.contains(&h.host_id) {
                let threshold = (ring.len() as f64 * 0.5).ceil() as usize;
                let threshold = threshold.max(2);
                if h.delete_hosts.len() > threshold {
                    self.with_retry(|| self.store.delete_history(repair_type, h.host_id))?;
                } else {
                    self.with_retry(|| self.store.add_delete_vote(repair_type, h.host_id, my_host_id, now))?;
                }
            }
        }

        // Step 3: insert rows for ring members with no history yet.
        let known: HashSet<HostId> = histories.iter().map(|h| h.host_id).collect();
        for host_id in &ring {
            if !known.contains(host_id) {
                self.with_retry(|| {
                    self.store.insert_history_if_absent(
                        repair_type,
                        *host_id,
                        now,
                        now,
                        config.force_repair_new_node,
                    )
                })?;
            }
        }

        // Re-read after reconciliation.
        let histories = self.store.select_history(repair_type)?;
        let by_host: HashMap<HostId, RepairHistory> =
            histories.into_iter().map(|h| (h.host_id, h)).collect();

        // Stuck-repair watchdog: a running row older than
        // `auto_repair_table_max_repair_time` is never unilaterally fixed
        // up on a peer's say-so (the store exposes no interface for that
        // short of the delete-hosts quorum), so a peer's stuck row is
        // metrics-only. My own row is different: nothing else will ever
        // clear it, so treat it as abandoned and let it re-enter normal
        // eligibility instead of resuming forever.
        let watchdog_millis = config.auto_repair_table_max_repair_time.as_millis() as i64;
        let is_stuck = |h: &RepairHistory| -> bool {
            watchdog_millis > 0 && h.is_running() && now - h.last_repair_start_ts > watchdog_millis
        };
        for h in by_host.values() {
            if h.host_id != my_host_id && is_stuck(h) {
                self.metrics.for_type(repair_type.as_str()).incr_stuck_peer_repair();
            }
        }

        let my_history = match by_host.get(&my_host_id) {
            Some(h) => h.clone(),
            None => {
                return Err(crate::error::AutoRepairError::InconsistentState(format!(
                    "no history row for {} after reconciliation",
                    my_host_id
                )))
            }
        };
        let my_is_stuck = is_stuck(&my_history);
        if my_is_stuck {
            log::warn!(
                "turn_for({:?}, {}): own running repair exceeded auto_repair_table_max_repair_time ({} ms), re-arming as abandoned",
                repair_type,
                my_host_id,
                watchdog_millis
            );
        }

        let running: Vec<HostId> = by_host
            .values()
            .filter(|h| h.is_running() && !h.force_repair && !(h.host_id == my_host_id && my_is_stuck))
            .map(|h| h.host_id)
            .collect();
        let forced_running: Vec<HostId> = by_host
            .values()
            .filter(|h| h.is_running() && h.force_repair && !(h.host_id == my_host_id && my_is_stuck))
            .map(|h| h.host_id)
            .collect();
        let busy: HashSet<HostId> = running.iter().chain(forced_running.iter()).copied().collect();
        let mut finished: Vec<HostId> = by_host
            .values()
            .filter(|h| !busy.contains(&h.host_id))
            .map(|h| h.host_id)
            .collect();

        // `repairStartLag` is recorded at the moment any MY_TURN* variant
        // is returned below, not just the plain-eligibility path.
        let record_lag = |decision: TurnDecision| -> TurnDecision {
            self.metrics
                .for_type(repair_type.as_str())
                .record_start_lag_millis(now - my_history.last_repair_finish_ts);
            decision
        };

        // Step 5: force-repair check.
        if my_history.force_repair && !busy.contains(&my_host_id) {
            return Ok(record_lag(TurnDecision::MyTurnForceRepair));
        }

        // Step 6: resumption check. Skipped when the watchdog above
        // re-armed my own row — it falls through to ordinary eligibility
        // instead of resuming the same stale banner forever.
        if busy.contains(&my_host_id) {
            return Ok(record_lag(TurnDecision::from_persisted(my_history.repair_turn)));
        }

        // Step 7: parallelism gate.
        let parallel_limit = config.parallel_limit(by_host.len());
        if running.len() >= parallel_limit {
            return Ok(TurnDecision::NotMyTurn);
        }

        // Step 8: priority override.
        let mut priorities = self.store.select_priorities(repair_type)?;
        priorities.retain(|h| ring_set.contains(h));
        // The persisted column is a CRDT set with no order of its own;
        // every node must derive the same head from the same snapshot, so
        // the head is the minimum HostId by the same byte-order tiebreak
        // the eligibility step uses below.
        if let Some(&head) = priorities.iter().min() {
            if head != my_host_id {
                return Ok(TurnDecision::NotMyTurn);
            }
            return Ok(record_lag(TurnDecision::MyTurnDueToPriority));
        }

        // Step 9: eligibility.
        finished.sort_by(|a, b| {
            let ha = &by_host[a];
            let hb = &by_host[b];
            ha.last_repair_finish_ts
                .cmp(&hb.last_repair_finish_ts)
                .then_with(|| a.cmp(b))
        });

        let eligible = if config.allow_parallel_replica_repair {
            finished.first().copied()
        } else {
            self.eligible_under_replica_constraint(
                repair_type,
                my_host_id,
                &finished,
                &by_host,
                config,
            )?
        };

        if eligible == Some(my_host_id) {
            Ok(record_lag(TurnDecision::MyTurn))
        } else {
            Ok(TurnDecision::NotMyTurn)
        }
    }

    fn eligible_under_replica_constraint(
        &self,
        repair_type: RepairType,
        my_host_id: HostId,
        finished: &[HostId],
        by_host: &HashMap<HostId, RepairHistory>,
        config: &RepairConfig,
    ) -> AutoRepairResult<Option<HostId>> {
        // Step 9.b: truncate at the first occurrence of myself (inclusive).
        let my_index = finished.iter().position(|h| *h == my_host_id);
        let candidates: &[HostId] = match my_index {
            Some(idx) => &finished[..=idx],
            None => finished,
        };

        // Step 9.c: collect busy hosts, including other schedules unless
        // configured not to.
        let mut busy_hosts: HashSet<HostId> = by_host
            .values()
            .filter(|h| h.is_running())
            .map(|h| h.host_id)
            .collect();

        if !config.allow_parallel_replica_repair_across_schedules {
            for (&other_type, _) in self.configs.iter() {
                if other_type == repair_type {
                    continue;
                }
                if !self.configs[&other_type].enabled {
                    continue;
                }
                let other_histories = self.store.select_history(other_type)?;
                for h in other_histories.iter().filter(|h| h.is_running()) {
                    // Step 9.d: cross-schedule deferral.
                    if h.host_id == my_host_id {
                        self.metrics
                            .for_type(repair_type.as_str())
                            .incr_repair_delayed_by_schedule();
                        return Ok(None);
                    }
                    busy_hosts.insert(h.host_id);
                }
            }
        }

        // Step 9.e: collect the distinct replication strategies across
        // considered keyspaces once, rather than re-checking every
        // keyspace's (possibly duplicate) strategy per candidate/busy pair.
        let distinct_strategies: Vec<&ReplicationStrategy> = self
            .keyspace_strategies
            .values()
            .unique_by(|strategy| format!("{:?}", strategy))
            .collect();

        // Exclude candidates that share a range with a busy host.
        for &candidate in candidates {
            let excluded = busy_hosts.iter().any(|&busy| {
                if busy == candidate {
                    return true;
                }
                distinct_strategies
                    .iter()
                    .any(|strategy| self.topology.shares_a_range(strategy, candidate, busy))
            });
            if excluded {
                if candidate == my_host_id {
                    self.metrics
                        .for_type(repair_type.as_str())
                        .incr_repair_delayed_by_replica();
                }
                continue;
            }
            return Ok(Some(candidate));
        }
        Ok(None)
    }

    /// Invoked exactly once before the executor starts running repair.
    /// Also removes this host from the priority list: removal happens
    /// exactly at `record_start` for the entry's host, not at the moment
    /// the priority override is observed in `turn_for`, so a node that
    /// never actually starts keeps its place in line.
    pub fn record_start(
        &self,
        repair_type: RepairType,
        host_id: HostId,
        now: EpochMillis,
        turn: TurnDecision,
    ) -> AutoRepairResult<()> {
        self.with_retry(|| self.store.update_start(repair_type, host_id, now, turn.to_persisted()))?;
        if turn == TurnDecision::MyTurnDueToPriority {
            self.with_retry(|| self.store.remove_priority(repair_type, host_id))?;
        }
        self.metrics.for_type(repair_type.as_str()).incr_cycle_starts();
        Ok(())
    }

    /// Invoked exactly once on completion (success or failure); also
    /// clears `force_repair`.
    pub fn record_finish(&self, repair_type: RepairType, host_id: HostId, now: EpochMillis) -> AutoRepairResult<()> {
        self.with_retry(|| self.store.update_finish(repair_type, host_id, now))?;
        self.metrics.for_type(repair_type.as_str()).incr_cycle_finishes();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet as StdHashSet;
    use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
    use std::sync::atomic::{AtomicU32, Ordering};

    use auto_repair_gossip::{NodeAddress, StaticRingView, StaticTopology};
    use auto_repair_sdk::FakeClock;
    use auto_repair_store::{InMemoryStore, PersistedStateStore, StoreResult};

    use super::*;
    use crate::config::default_full_config;

    /// Fails the first `flaky_calls` state-mutating calls to
    /// `insert_history_if_absent` with a transient error before delegating
    /// to a real `InMemoryStore` — exercises `TurnArbitrator::with_retry`'s
    /// retry-then-succeed path end to end.
    struct FlakyStore {
        inner: InMemoryStore,
        remaining_failures: AtomicU32,
    }

    impl FlakyStore {
        fn new(flaky_calls: u32) -> Self {
            Self {
                inner: InMemoryStore::new(),
                remaining_failures: AtomicU32::new(flaky_calls),
            }
        }
    }

    impl PersistedStateStore for FlakyStore {
        fn select_history(&self, repair_type: RepairType) -> StoreResult<Vec<RepairHistory>> {
            self.inner.select_history(repair_type)
        }

        fn insert_history_if_absent(
            &self,
            repair_type: RepairType,
            host_id: HostId,
            start: EpochMillis,
            finish: EpochMillis,
            force_repair: bool,
        ) -> StoreResult<bool> {
            if self
                .remaining_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    if n > 0 {
                        Some(n - 1)
                    } else {
                        None
                    }
                })
                .is_ok()
            {
                return Err(StoreError::Transient("simulated quorum timeout".to_string()));
            }
            self.inner
                .insert_history_if_absent(repair_type, host_id, start, finish, force_repair)
        }

        fn update_start(
            &self,
            repair_type: RepairType,
            host_id: HostId,
            ts: EpochMillis,
            turn: PersistedTurn,
        ) -> StoreResult<()> {
            self.inner.update_start(repair_type, host_id, ts, turn)
        }

        fn update_finish(&self, repair_type: RepairType, host_id: HostId, ts: EpochMillis) -> StoreResult<()> {
            self.inner.update_finish(repair_type, host_id, ts)
        }

        fn add_delete_vote(
            &self,
            repair_type: RepairType,
            host_id: HostId,
            voter_host_id: HostId,
            now: EpochMillis,
        ) -> StoreResult<()> {
            self.inner.add_delete_vote(repair_type, host_id, voter_host_id, now)
        }

        fn clear_delete_votes(&self, repair_type: RepairType, host_id: HostId) -> StoreResult<()> {
            self.inner.clear_delete_votes(repair_type, host_id)
        }

        fn delete_history(&self, repair_type: RepairType, host_id: HostId) -> StoreResult<()> {
            self.inner.delete_history(repair_type, host_id)
        }

        fn select_priorities(&self, repair_type: RepairType) -> StoreResult<StdHashSet<HostId>> {
            self.inner.select_priorities(repair_type)
        }

        fn add_priority(&self, repair_type: RepairType, host_ids: &[HostId]) -> StoreResult<()> {
            self.inner.add_priority(repair_type, host_ids)
        }

        fn remove_priority(&self, repair_type: RepairType, host_id: HostId) -> StoreResult<()> {
            self.inner.remove_priority(repair_type, host_id)
        }
    }

    fn host(n: u8) -> HostId {
        let mut bytes = [0u8; 16];
        bytes[15] = n;
        HostId::from_bytes(bytes)
    }

    fn node(n: u8) -> NodeAddress {
        NodeAddress::new(
            host(n),
            SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 8000 + n as u16)),
            "dc1",
        )
    }

    fn three_node_arbitrator(clock: Arc<FakeClock>) -> (TurnArbitrator, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let ring = Arc::new(StaticRingView::new(vec![node(1), node(2), node(3)]));
        let topology = Arc::new(StaticTopology::new());
        let metrics = Arc::new(MetricsRegistry::default());
        let mut configs = HashMap::new();
        configs.insert(RepairType::Full, default_full_config());
        let arbitrator = TurnArbitrator::new(
            store.clone(),
            ring,
            topology,
            clock,
            metrics,
            configs,
            HashMap::new(),
        );
        (arbitrator, store)
    }

    #[test]
    fn only_the_lowest_host_id_gets_the_first_turn() {
        let clock = Arc::new(FakeClock::new(1_000));
        let (arbitrator, _store) = three_node_arbitrator(clock);

        assert_eq!(arbitrator.turn_for(RepairType::Full, host(1)), TurnDecision::MyTurn);
        assert_eq!(arbitrator.turn_for(RepairType::Full, host(2)), TurnDecision::NotMyTurn);
        assert_eq!(arbitrator.turn_for(RepairType::Full, host(3)), TurnDecision::NotMyTurn);
    }

    #[test]
    fn a_transient_store_error_is_retried_instead_of_failing_the_tick() {
        let clock = Arc::new(FakeClock::new(1_000));
        let store = Arc::new(FlakyStore::new(2));
        let ring = Arc::new(StaticRingView::new(vec![node(1), node(2), node(3)]));
        let topology = Arc::new(StaticTopology::new());
        let metrics = Arc::new(MetricsRegistry::default());
        let mut configs = HashMap::new();
        configs.insert(RepairType::Full, default_full_config());
        // Zero-wait spec: the test exercises the retry loop's control flow,
        // not real backoff timing.
        let retry_spec = RetrySpec {
            base: std::time::Duration::ZERO,
            cap: std::time::Duration::ZERO,
            retries: Some(5),
        };
        let arbitrator = TurnArbitrator::with_retry_spec(
            store, ring, topology, clock, metrics, configs, HashMap::new(), retry_spec,
        );

        // insert_history_if_absent fails twice per ring member before
        // succeeding; turn_for should still resolve cleanly rather than
        // collapsing to NOT_MY_TURN.
        assert_eq!(arbitrator.turn_for(RepairType::Full, host(1)), TurnDecision::MyTurn);
    }

    #[test]
    fn a_priority_vote_overrides_the_turn_order() {
        let clock = Arc::new(FakeClock::new(1_000));
        let (arbitrator, store) = three_node_arbitrator(clock);
        store.add_priority(RepairType::Full, &[host(3)]).unwrap();

        assert_eq!(
            arbitrator.turn_for(RepairType::Full, host(3)),
            TurnDecision::MyTurnDueToPriority
        );
        assert_eq!(arbitrator.turn_for(RepairType::Full, host(1)), TurnDecision::NotMyTurn);
    }

    #[test]
    fn a_running_row_resumes_its_persisted_turn_without_a_fresh_start_record() {
        let clock = Arc::new(FakeClock::new(1_000));
        let (arbitrator, store) = three_node_arbitrator(clock);
        store
            .insert_history_if_absent(RepairType::Full, host(1), 50, 50, false)
            .unwrap();
        store
            .update_start(RepairType::Full, host(1), 100, PersistedTurn::MyTurnDueToPriority)
            .unwrap();

        assert_eq!(
            arbitrator.turn_for(RepairType::Full, host(1)),
            TurnDecision::MyTurnDueToPriority
        );
        let rows = store.select_history(RepairType::Full).unwrap();
        let row = rows.iter().find(|h| h.host_id == host(1)).unwrap();
        assert_eq!(row.last_repair_start_ts, 100);
    }

    #[test]
    fn a_host_evicted_from_the_ring_is_deleted_once_enough_peers_vote() {
        let clock = Arc::new(FakeClock::new(1_000));
        let (arbitrator, store) = three_node_arbitrator(clock);
        let ghost = host(99);
        store
            .insert_history_if_absent(RepairType::Full, ghost, 0, 0, false)
            .unwrap();
        store.add_delete_vote(RepairType::Full, ghost, host(1), 0).unwrap();
        store.add_delete_vote(RepairType::Full, ghost, host(2), 0).unwrap();

        // First tick casts the third vote but does not delete yet.
        arbitrator.turn_for(RepairType::Full, host(3));
        let rows = store.select_history(RepairType::Full).unwrap();
        assert!(rows.iter().any(|h| h.host_id == ghost));

        // A later tick observes three votes, past the eviction threshold,
        // and deletes the row.
        arbitrator.turn_for(RepairType::Full, host(1));
        let rows = store.select_history(RepairType::Full).unwrap();
        assert!(!rows.iter().any(|h| h.host_id == ghost));
    }

    #[test]
    fn a_wedged_own_row_past_the_watchdog_re_arms_instead_of_resuming_forever() {
        let clock = Arc::new(FakeClock::new(0));
        let (arbitrator, store) = three_node_arbitrator(clock.clone());
        store
            .insert_history_if_absent(RepairType::Full, host(1), 0, 0, false)
            .unwrap();
        // start(1) > finish(0): host 1's row is running from t=1.
        store
            .update_start(RepairType::Full, host(1), 1, PersistedTurn::MyTurn)
            .unwrap();

        // Still well within the watchdog window: resumption check applies.
        clock.set(1_000);
        assert_eq!(arbitrator.turn_for(RepairType::Full, host(1)), TurnDecision::MyTurn);

        // Past default_full_config's six-hour watchdog: the row is
        // treated as abandoned rather than resumed.
        clock.set(7 * 3600 * 1000);
        let decision = arbitrator.turn_for(RepairType::Full, host(1));
        assert_ne!(decision, TurnDecision::NotMyTurn);
    }
}
