use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use auto_repair_gossip::{ReplicationStrategy, ReplicationTopology};
use auto_repair_metrics::MetricsRegistry;
use auto_repair_sdk::{HostId, RepairType, TokenRange};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::assignment::{KeyspacePlan, KeyspaceRepairAssignments, SizedRepairAssignment};
use crate::config::{ByteBudget, RepairConfig};
use crate::error::{AutoRepairError, AutoRepairResult};
use crate::size_oracle::SizeOracle;

fn div_ceil(n: u64, d: u64) -> u64 {
    if d == 0 {
        return if n == 0 { 0 } else { n };
    }
    (n + d - 1) / d
}

/// Merges a same-range table batch into one assignment with summed bytes,
/// or returns the lone assignment unmerged if the batch holds just one
/// table. `None` for an empty batch.
fn flush_batch(batch: &mut Vec<(String, SizedRepairAssignment)>, keyspace: &str) -> Option<SizedRepairAssignment> {
    if batch.is_empty() {
        return None;
    }
    if batch.len() == 1 {
        return Some(batch.pop().unwrap().1);
    }
    let range = batch[0].1.range;
    let total_bytes: u64 = batch.iter().map(|(_, a)| a.estimated_bytes).sum();
    let table_names: Vec<String> = batch.drain(..).map(|(t, _)| t).collect();
    Some(SizedRepairAssignment {
        keyspace: keyspace.to_string(),
        description: format!(
            "batched repair of {} tables in {}: {}",
            table_names.len(),
            keyspace,
            table_names.join(", ")
        ),
        tables: table_names,
        range,
        estimated_bytes: total_bytes,
    })
}

/// Splits a node's share of a keyspace's ranges into byte/partition-budgeted
/// assignments, batches small single-range tables together, and filters the
/// result against a schedule-wide byte budget.
pub struct AssignmentSplitter {
    size_oracle: Arc<dyn SizeOracle>,
    topology: Arc<dyn ReplicationTopology>,
    metrics: Arc<MetricsRegistry>,
    keyspace_strategies: HashMap<String, ReplicationStrategy>,
    rng: Mutex<StdRng>,
    ring_min_token: i64,
    ring_max_token: i64,
}

impl AssignmentSplitter {
    pub fn new(
        size_oracle: Arc<dyn SizeOracle>,
        topology: Arc<dyn ReplicationTopology>,
        metrics: Arc<MetricsRegistry>,
        keyspace_strategies: HashMap<String, ReplicationStrategy>,
    ) -> Self {
        Self {
            size_oracle,
            topology,
            metrics,
            keyspace_strategies,
            rng: Mutex::new(StdRng::from_entropy()),
            ring_min_token: i64::MIN,
            ring_max_token: i64::MAX,
        }
    }

    /// Deterministic-shuffle constructor for tests: same seed, same
    /// range order, every run.
    pub fn with_rng_seed(
        size_oracle: Arc<dyn SizeOracle>,
        topology: Arc<dyn ReplicationTopology>,
        metrics: Arc<MetricsRegistry>,
        keyspace_strategies: HashMap<String, ReplicationStrategy>,
        seed: u64,
    ) -> Self {
        Self {
            size_oracle,
            topology,
            metrics,
            keyspace_strategies,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ring_min_token: i64::MIN,
            ring_max_token: i64::MAX,
        }
    }

    /// Builds the lazy, single-consumer sequence of per-keyspace plans for
    /// `my_endpoint`. One `KeyspaceRepairAssignments` is produced per input
    /// plan, in the order given; each carries the bytes its own keyspace
    /// contributed toward the running schedule-wide budget before the next
    /// plan is even considered — a generator-style, non-restartable
    /// iteration with state carried across elements.
    pub fn plan(
        &self,
        repair_type: RepairType,
        my_endpoint: HostId,
        primary_range_only: bool,
        plans: Vec<KeyspacePlan>,
        config: RepairConfig,
    ) -> AssignmentPlanIter<'_> {
        AssignmentPlanIter {
            splitter: self,
            repair_type,
            my_endpoint,
            primary_range_only,
            queue: plans.into(),
            config,
            bytes_so_far: 0,
        }
    }

    fn plan_one_keyspace(
        &self,
        repair_type: RepairType,
        my_endpoint: HostId,
        primary_range_only: bool,
        plan: &KeyspacePlan,
        config: &RepairConfig,
        bytes_so_far: &mut u64,
    ) -> AutoRepairResult<KeyspaceRepairAssignments> {
        let strategy = self.keyspace_strategies.get(&plan.keyspace).ok_or_else(|| {
            AutoRepairError::InconsistentState(format!(
                "no replication strategy registered for keyspace {}",
                plan.keyspace
            ))
        })?;

        let owned_ranges = if primary_range_only {
            self.topology.primary_ranges(my_endpoint)
        } else {
            self.topology.replicas_of(strategy, my_endpoint)
        };

        let mut ranges = Vec::with_capacity(owned_ranges.len());
        for r in owned_ranges {
            ranges.extend(r.unwrap_ring(self.ring_min_token, self.ring_max_token));
        }
        ranges.shuffle(&mut *self.rng.lock());

        // A table concurrently dropped between planning steps is logged
        // once and that table alone is skipped — it must not abort the
        // rest of the keyspace's plan (spec §4.6.2 / §7 MissingTableError).
        let mut tables: Vec<String> = Vec::with_capacity(plan.tables.len());
        for table in &plan.tables {
            if self.size_oracle.table_exists(&plan.keyspace, table) {
                tables.push(table.clone());
            } else {
                log::warn!("table {}.{} disappeared mid-plan, skipping", plan.keyspace, table);
            }
        }

        if config.repair_by_keyspace {
            let mut sized = Vec::with_capacity(tables.len());
            for table in &tables {
                match self.size_oracle.table_size_hint(&plan.keyspace, table) {
                    Ok(hint) => sized.push((table.clone(), hint)),
                    Err(AutoRepairError::MissingTable { .. }) => {
                        log::warn!("table {}.{} disappeared mid-plan, skipping", plan.keyspace, table);
                    }
                    Err(err) => return Err(err),
                }
            }
            sized.sort_by_key(|(_, size)| *size);
            tables = sized.into_iter().map(|(t, _)| t).collect();
        }

        let mut produced: Vec<SizedRepairAssignment> = Vec::new();
        for range in &ranges {
            let mut current_batch: Vec<(String, SizedRepairAssignment)> = Vec::new();
            for table in &tables {
                let per_table = match self.plan_table_range(repair_type, &plan.keyspace, table, *range, config) {
                    Ok(per_table) => per_table,
                    Err(AutoRepairError::MissingTable { .. }) => {
                        log::warn!("table {}.{} disappeared mid-plan, skipping", plan.keyspace, table);
                        continue;
                    }
                    Err(err) => return Err(err),
                };

                if config.repair_by_keyspace && per_table.len() == 1 {
                    let candidate = per_table.into_iter().next().unwrap();
                    let batch_bytes: u64 = current_batch.iter().map(|(_, a)| a.estimated_bytes).sum();
                    let projected = batch_bytes + candidate.estimated_bytes;
                    let fits_budget = match config.splitter.max_bytes_per_schedule {
                        ByteBudget::Unlimited => true,
                        ByteBudget::Bytes(limit) => projected < limit,
                    };
                    let room = current_batch.len() < config.splitter.max_tables_per_assignment;
                    if room && fits_budget {
                        current_batch.push((table.clone(), candidate));
                    } else {
                        if let Some(merged) = flush_batch(&mut current_batch, &plan.keyspace) {
                            produced.push(merged);
                        }
                        current_batch.push((table.clone(), candidate));
                    }
                } else {
                    if let Some(merged) = flush_batch(&mut current_batch, &plan.keyspace) {
                        produced.push(merged);
                    }
                    produced.extend(per_table);
                }
            }
            if let Some(merged) = flush_batch(&mut current_batch, &plan.keyspace) {
                produced.push(merged);
            }
        }

        let mut admitted = Vec::with_capacity(produced.len());
        let mut skipped_bytes: u64 = 0;
        for assignment in produced {
            if config
                .splitter
                .max_bytes_per_schedule
                .admits(*bytes_so_far, assignment.estimated_bytes)
            {
                *bytes_so_far += assignment.estimated_bytes;
                admitted.push(assignment);
            } else {
                skipped_bytes += assignment.estimated_bytes;
                self.metrics
                    .for_type(repair_type.as_str())
                    .incr_assignments_skipped_by_budget(1);
            }
        }
        if skipped_bytes > 0 {
            let message = format!(
                "schedule byte budget reached, skipped {} bytes in keyspace {}",
                skipped_bytes, plan.keyspace
            );
            if repair_type == RepairType::Incremental {
                log::info!("{}", message);
            } else {
                log::warn!("{}", message);
            }
        }

        Ok(KeyspaceRepairAssignments {
            priority_bucket: plan.priority_bucket,
            keyspace: plan.keyspace.clone(),
            assignments: admitted,
        })
    }

    /// Plans one table's share of one range: falls back to the
    /// write-buffer estimate when the table has no data on disk yet,
    /// otherwise splits when either the byte or partition ceiling is
    /// exceeded, picking whichever ceiling demands more pieces.
    fn plan_table_range(
        &self,
        repair_type: RepairType,
        keyspace: &str,
        table: &str,
        range: TokenRange,
        config: &RepairConfig,
    ) -> AutoRepairResult<Vec<SizedRepairAssignment>> {
        let estimate = self.size_oracle.estimate(repair_type, keyspace, table, range)?;
        let size = estimate.size_for_repair();

        if size == 0 {
            let write_buffer = self.size_oracle.write_buffer_bytes(keyspace, table)?;
            return Ok(vec![SizedRepairAssignment {
                keyspace: keyspace.to_string(),
                tables: vec![table.to_string()],
                range,
                estimated_bytes: write_buffer,
                description: format!(
                    "full range repair of {}.{} (nothing on disk, using write buffer)",
                    keyspace, table
                ),
            }]);
        }

        let needs_split = size > config.splitter.bytes_per_assignment
            || estimate.partitions > config.splitter.partitions_per_assignment;
        if !needs_split {
            return Ok(vec![SizedRepairAssignment {
                keyspace: keyspace.to_string(),
                tables: vec![table.to_string()],
                range,
                estimated_bytes: size,
                description: format!("full range repair of {}.{}", keyspace, table),
            }]);
        }

        let splits_for_size = div_ceil(size, config.splitter.bytes_per_assignment);
        let splits_for_partitions = div_ceil(estimate.partitions, config.splitter.partitions_per_assignment);
        let (splits, winner) = if splits_for_partitions > splits_for_size {
            (splits_for_partitions, "partition count")
        } else {
            (splits_for_size, "byte size")
        };
        let splits = (splits.max(1)) as usize;

        let subranges = match self.topology.split_range(range, splits) {
            Some(subranges) => subranges,
            None => {
                log::warn!(
                    "no partitioner-aware splitter available for {}.{}, falling back to an even split",
                    keyspace,
                    table
                );
                range.split_evenly(splits)
            }
        };
        let piece_count = subranges.len().max(1) as u64;
        let per_split_bytes = size / piece_count;

        Ok(subranges
            .into_iter()
            .enumerate()
            .map(|(i, sub)| SizedRepairAssignment {
                keyspace: keyspace.to_string(),
                tables: vec![table.to_string()],
                range: sub,
                estimated_bytes: per_split_bytes,
                description: format!(
                    "split {}/{} of {}.{} by {}",
                    i + 1,
                    piece_count,
                    keyspace,
                    table,
                    winner
                ),
            })
            .collect())
    }
}

/// The lazy sequence `AssignmentSplitter::plan` returns. Not restartable:
/// `bytes_so_far` accumulates across every item it yields. Unlike hidden
/// statics elsewhere in this workspace, this state lives on the iterator
/// value itself, owned by whichever caller is driving it.
pub struct AssignmentPlanIter<'a> {
    splitter: &'a AssignmentSplitter,
    repair_type: RepairType,
    my_endpoint: HostId,
    primary_range_only: bool,
    queue: VecDeque<KeyspacePlan>,
    config: RepairConfig,
    bytes_so_far: u64,
}

impl<'a> Iterator for AssignmentPlanIter<'a> {
    type Item = KeyspaceRepairAssignments;

    fn next(&mut self) -> Option<Self::Item> {
        let plan = self.queue.pop_front()?;

        if self
            .config
            .splitter
            .max_bytes_per_schedule
            .is_exhausted(self.bytes_so_far)
        {
            return Some(KeyspaceRepairAssignments {
                priority_bucket: plan.priority_bucket,
                keyspace: plan.keyspace,
                assignments: Vec::new(),
            });
        }

        match self.splitter.plan_one_keyspace(
            self.repair_type,
            self.my_endpoint,
            self.primary_range_only,
            &plan,
            &self.config,
            &mut self.bytes_so_far,
        ) {
            Ok(result) => Some(result),
            Err(err) => {
                log::warn!(
                    "skipping keyspace {} (priority bucket {}): {}",
                    plan.keyspace,
                    plan.priority_bucket,
                    err
                );
                Some(KeyspaceRepairAssignments {
                    priority_bucket: plan.priority_bucket,
                    keyspace: plan.keyspace,
                    assignments: Vec::new(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_full_config, default_incremental_config, ByteBudget};
    use crate::size_oracle::test_support::StaticSizeOracle;
    use auto_repair_gossip::StaticTopology;

    fn host(n: u8) -> HostId {
        let mut bytes = [0u8; 16];
        bytes[15] = n;
        HostId::from_bytes(bytes)
    }

    fn registry() -> Arc<MetricsRegistry> {
        Arc::new(MetricsRegistry::default())
    }

    #[test]
    fn small_table_yields_one_unsplit_assignment() {
        let oracle = Arc::new(StaticSizeOracle::new());
        let range = TokenRange::new(0, 100);
        oracle.with_table("ks", "t1", 10, 0);
        oracle.with_estimate(
            "ks",
            "t1",
            range,
            10,
            5 * GIB_FOR_TEST,
            5 * GIB_FOR_TEST,
            RepairType::Full,
        );
        let topology = Arc::new(StaticTopology::new().with_owned(host(1), vec![range]));
        let mut strategies = HashMap::new();
        strategies.insert(
            "ks".to_string(),
            ReplicationStrategy::Simple { replication_factor: 3 },
        );
        let splitter = AssignmentSplitter::with_rng_seed(oracle, topology, registry(), strategies, 1);

        let plans = vec![KeyspacePlan {
            priority_bucket: 0,
            keyspace: "ks".to_string(),
            tables: vec!["t1".to_string()],
        }];
        let config = default_full_config();
        let results: Vec<_> = splitter
            .plan(RepairType::Full, host(1), false, plans, config)
            .collect();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].assignments.len(), 1);
        assert_eq!(results[0].assignments[0].tables, vec!["t1".to_string()]);
    }

    const GIB_FOR_TEST: u64 = 1 << 30;

    #[test]
    fn oversized_table_splits_by_byte_ceiling() {
        let oracle = Arc::new(StaticSizeOracle::new());
        let range = TokenRange::new(0, 1000);
        oracle.with_table("ks", "big", 200 * GIB_FOR_TEST, 0);
        oracle.with_estimate(
            "ks",
            "big",
            range,
            100,
            120 * GIB_FOR_TEST,
            120 * GIB_FOR_TEST,
            RepairType::Full,
        );
        let topology = Arc::new(StaticTopology::new().with_owned(host(1), vec![range]));
        let mut strategies = HashMap::new();
        strategies.insert(
            "ks".to_string(),
            ReplicationStrategy::Simple { replication_factor: 3 },
        );
        let splitter = AssignmentSplitter::with_rng_seed(oracle, topology, registry(), strategies, 7);

        let mut config = default_full_config();
        config.splitter.bytes_per_assignment = 50 * GIB_FOR_TEST;
        let plans = vec![KeyspacePlan {
            priority_bucket: 0,
            keyspace: "ks".to_string(),
            tables: vec!["big".to_string()],
        }];
        let results: Vec<_> = splitter
            .plan(RepairType::Full, host(1), false, plans, config)
            .collect();

        // ceil(120/50) == 3 pieces
        assert_eq!(results[0].assignments.len(), 3);
    }

    #[test]
    fn empty_table_falls_back_to_write_buffer_bytes() {
        let oracle = Arc::new(StaticSizeOracle::new());
        let range = TokenRange::new(0, 100);
        oracle.with_table("ks", "empty", 0, 4096);
        let topology = Arc::new(StaticTopology::new().with_owned(host(1), vec![range]));
        let mut strategies = HashMap::new();
        strategies.insert(
            "ks".to_string(),
            ReplicationStrategy::Simple { replication_factor: 3 },
        );
        let splitter = AssignmentSplitter::with_rng_seed(oracle, topology, registry(), strategies, 3);

        let plans = vec![KeyspacePlan {
            priority_bucket: 0,
            keyspace: "ks".to_string(),
            tables: vec!["empty".to_string()],
        }];
        let results: Vec<_> = splitter
            .plan(RepairType::Full, host(1), false, plans, default_full_config())
            .collect();

        assert_eq!(results[0].assignments[0].estimated_bytes, 4096);
    }

    #[test]
    fn small_tables_sharing_a_range_are_batched_under_keyspace_repair() {
        let oracle = Arc::new(StaticSizeOracle::new());
        let range = TokenRange::new(0, 100);
        for t in ["a", "b", "c"] {
            oracle.with_table("ks", t, 1, 0);
            oracle.with_estimate("ks", t, range, 1, 1024, 1024, RepairType::Full);
        }
        let topology = Arc::new(StaticTopology::new().with_owned(host(1), vec![range]));
        let mut strategies = HashMap::new();
        strategies.insert(
            "ks".to_string(),
            ReplicationStrategy::Simple { replication_factor: 3 },
        );
        let splitter = AssignmentSplitter::with_rng_seed(oracle, topology, registry(), strategies, 11);

        let mut config = default_full_config();
        config.repair_by_keyspace = true;
        let plans = vec![KeyspacePlan {
            priority_bucket: 0,
            keyspace: "ks".to_string(),
            tables: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        }];
        let results: Vec<_> = splitter
            .plan(RepairType::Full, host(1), false, plans, config)
            .collect();

        assert_eq!(results[0].assignments.len(), 1);
        assert!(results[0].assignments[0].is_batched());
        assert_eq!(results[0].assignments[0].estimated_bytes, 3072);
    }

    #[test]
    fn a_table_missing_from_the_oracle_is_skipped_without_dropping_its_keyspace() {
        // "gone" was never registered with `with_table`, simulating a
        // table dropped concurrently with planning. It must be skipped on
        // its own, not abort assignments for "a" and "c" in the same plan.
        let oracle = Arc::new(StaticSizeOracle::new());
        let range = TokenRange::new(0, 100);
        for t in ["a", "c"] {
            oracle.with_table("ks", t, 1, 0);
            oracle.with_estimate("ks", t, range, 1, 1024, 1024, RepairType::Full);
        }
        let topology = Arc::new(StaticTopology::new().with_owned(host(1), vec![range]));
        let mut strategies = HashMap::new();
        strategies.insert(
            "ks".to_string(),
            ReplicationStrategy::Simple { replication_factor: 3 },
        );
        let splitter = AssignmentSplitter::with_rng_seed(oracle, topology, registry(), strategies, 13);

        let plans = vec![KeyspacePlan {
            priority_bucket: 0,
            keyspace: "ks".to_string(),
            tables: vec!["a".to_string(), "gone".to_string(), "c".to_string()],
        }];
        let results: Vec<_> = splitter
            .plan(RepairType::Full, host(1), false, plans, default_full_config())
            .collect();

        // "a" and "c" share the same range and batch into one assignment
        // under the default `repair_by_keyspace` config; "gone" never
        // appears anywhere in the output.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].assignments.len(), 1);
        assert!(results[0].assignments[0].is_batched());
        let tables = &results[0].assignments[0].tables;
        assert!(tables.contains(&"a".to_string()));
        assert!(tables.contains(&"c".to_string()));
        assert!(!tables.contains(&"gone".to_string()));
    }

    #[test]
    fn schedule_budget_exhaustion_yields_empty_sentinel_for_later_keyspaces() {
        let oracle = Arc::new(StaticSizeOracle::new());
        let range = TokenRange::new(0, 100);
        oracle.with_table("ks1", "t1", 10, 0);
        oracle.with_estimate(
            "ks1",
            "t1",
            range,
            1,
            80 * GIB_FOR_TEST,
            80 * GIB_FOR_TEST,
            RepairType::Incremental,
        );
        oracle.with_table("ks2", "t2", 10, 0);
        oracle.with_estimate(
            "ks2",
            "t2",
            range,
            1,
            80 * GIB_FOR_TEST,
            80 * GIB_FOR_TEST,
            RepairType::Incremental,
        );
        let topology = Arc::new(
            StaticTopology::new()
                .with_owned(host(1), vec![range])
                .with_primary(host(1), vec![range]),
        );
        let mut strategies = HashMap::new();
        strategies.insert(
            "ks1".to_string(),
            ReplicationStrategy::Simple { replication_factor: 3 },
        );
        strategies.insert(
            "ks2".to_string(),
            ReplicationStrategy::Simple { replication_factor: 3 },
        );
        let splitter = AssignmentSplitter::with_rng_seed(oracle, topology, registry(), strategies, 5);

        let mut config = default_incremental_config();
        config.splitter.max_bytes_per_schedule = ByteBudget::Bytes(100 * GIB_FOR_TEST);
        config.splitter.bytes_per_assignment = 100 * GIB_FOR_TEST;
        let plans = vec![
            KeyspacePlan {
                priority_bucket: 0,
                keyspace: "ks1".to_string(),
                tables: vec!["t1".to_string()],
            },
            KeyspacePlan {
                priority_bucket: 0,
                keyspace: "ks2".to_string(),
                tables: vec!["t2".to_string()],
            },
        ];
        let results: Vec<_> = splitter
            .plan(RepairType::Incremental, host(1), true, plans, config)
            .collect();

        assert_eq!(results.len(), 2);
        assert!(!results[0].is_empty());
        assert!(results[1].is_empty());
    }

    #[test]
    fn a_high_partition_count_splits_more_than_the_byte_ceiling_alone_would() {
        // 4 GiB of data (well under the 50 GiB byte ceiling) but 4*2^20
        // partitions against a 2^20-per-assignment ceiling: partition
        // count must win the split-count race, not byte size.
        let oracle = Arc::new(StaticSizeOracle::new());
        let range = TokenRange::new(0, 1000);
        oracle.with_table("ks", "dense", 4 * GIB_FOR_TEST, 0);
        oracle.with_estimate(
            "ks",
            "dense",
            range,
            4 * (1 << 20),
            4 * GIB_FOR_TEST,
            4 * GIB_FOR_TEST,
            RepairType::Full,
        );
        let topology = Arc::new(StaticTopology::new().with_owned(host(1), vec![range]));
        let mut strategies = HashMap::new();
        strategies.insert(
            "ks".to_string(),
            ReplicationStrategy::Simple { replication_factor: 3 },
        );
        let splitter = AssignmentSplitter::with_rng_seed(oracle, topology, registry(), strategies, 42);

        let config = default_full_config();
        let plans = vec![KeyspacePlan {
            priority_bucket: 0,
            keyspace: "ks".to_string(),
            tables: vec!["dense".to_string()],
        }];
        let results: Vec<_> = splitter
            .plan(RepairType::Full, host(1), false, plans, config)
            .collect();

        // splitsForSize = ceil(4GiB / 50GiB) = 1, splitsForPartitions =
        // ceil(4*2^20 / 2^20) = 4: partitions must win.
        assert_eq!(results[0].assignments.len(), 4);
        assert!(results[0].assignments[0].description.contains("partition count"));
    }
}
