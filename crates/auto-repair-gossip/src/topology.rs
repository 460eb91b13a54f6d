use std::collections::HashMap;

use auto_repair_sdk::{HostId, TokenRange};

/// A replication strategy, represented as a tagged variant with a
/// capability set rather than a trait object the core would need to
/// downcast. A dynamic-downcast strategy hierarchy is the obvious first
/// design; this enum sidesteps it since the strategy set is small and
/// closed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplicationStrategy {
    /// The meta/local singleton strategy used by single-node system
    /// keyspaces; never a candidate for repair.
    LocalOnly,
    /// Replicates a fixed count across the whole ring, DC-agnostic.
    Simple { replication_factor: usize },
    /// Replicates a configured count per datacenter.
    NetworkTopologyAware {
        replication_factor_per_dc: HashMap<String, usize>,
    },
}

impl ReplicationStrategy {
    pub fn is_topology_aware(&self) -> bool {
        matches!(self, ReplicationStrategy::NetworkTopologyAware { .. })
    }

    pub fn is_local_only(&self) -> bool {
        matches!(self, ReplicationStrategy::LocalOnly)
    }

    pub fn includes_datacenter(&self, dc: &str) -> bool {
        match self {
            ReplicationStrategy::LocalOnly => false,
            ReplicationStrategy::Simple { .. } => true,
            ReplicationStrategy::NetworkTopologyAware {
                replication_factor_per_dc,
            } => replication_factor_per_dc
                .get(dc)
                .map(|&rf| rf > 0)
                .unwrap_or(false),
        }
    }
}

/// Determines whether a keyspace should be considered for repair at all.
pub fn keyspace_eligible_for_repair(
    strategy: &ReplicationStrategy,
    local_dc: &str,
    is_trace_keyspace: bool,
    is_materialized_view: bool,
    materialized_view_repair_enabled: bool,
) -> bool {
    if strategy.is_local_only() {
        return false;
    }
    if is_trace_keyspace {
        return false;
    }
    if strategy.is_topology_aware() && !strategy.includes_datacenter(local_dc) {
        return false;
    }
    if is_materialized_view && !materialized_view_repair_enabled {
        return false;
    }
    true
}

/// Replica-overlap and ownership queries over a replication strategy.
///
/// Specified only through this interface: the actual ring-to-range
/// placement math belongs to the cluster metadata service, out of scope
/// here.
pub trait ReplicationTopology: Send + Sync {
    /// Ranges owned (as any replica) by `endpoint` under `strategy`.
    fn replicas_of(&self, strategy: &ReplicationStrategy, endpoint: HostId) -> Vec<TokenRange>;

    /// Replica endpoints for `range` under `strategy`.
    fn endpoints_for_range(&self, strategy: &ReplicationStrategy, range: TokenRange) -> Vec<HostId>;

    /// The ranges for which `endpoint` is the first replica (its primary
    /// ranges).
    fn primary_ranges(&self, endpoint: HostId) -> Vec<TokenRange>;

    /// Splits `range` into `n` subranges using the partitioner's own
    /// splitter, if one is available for the current partitioner. `None`
    /// means no such splitter exists; the caller falls back to
    /// `TokenRange::split_evenly` and logs a warning.
    fn split_range(&self, _range: TokenRange, _n: usize) -> Option<Vec<TokenRange>> {
        None
    }

    /// True iff `a` and `b` share at least one token range as replicas
    /// under `strategy` — the replica-overlap predicate used by the
    /// non-parallel eligibility path.
    fn shares_a_range(&self, strategy: &ReplicationStrategy, a: HostId, b: HostId) -> bool {
        let a_ranges = self.replicas_of(strategy, a);
        let b_ranges = self.replicas_of(strategy, b);
        a_ranges.iter().any(|ra| {
            b_ranges
                .iter()
                .any(|rb| ra.start == rb.start && ra.end == rb.end)
        })
    }
}

/// A fixed, in-memory topology for tests: endpoint -> owned ranges, plus a
/// primary-range subset per endpoint.
#[derive(Default)]
pub struct StaticTopology {
    owned: HashMap<HostId, Vec<TokenRange>>,
    primary: HashMap<HostId, Vec<TokenRange>>,
}

impl StaticTopology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_owned(mut self, endpoint: HostId, ranges: Vec<TokenRange>) -> Self {
        self.owned.insert(endpoint, ranges);
        self
    }

    pub fn with_primary(mut self, endpoint: HostId, ranges: Vec<TokenRange>) -> Self {
        self.primary.insert(endpoint, ranges);
        self
    }
}

impl ReplicationTopology for StaticTopology {
    fn replicas_of(&self, _strategy: &ReplicationStrategy, endpoint: HostId) -> Vec<TokenRange> {
        self.owned.get(&endpoint).cloned().unwrap_or_default()
    }

    fn endpoints_for_range(&self, _strategy: &ReplicationStrategy, range: TokenRange) -> Vec<HostId> {
        self.owned
            .iter()
            .filter(|(_, ranges)| ranges.iter().any(|r| r.start == range.start && r.end == range.end))
            .map(|(host, _)| *host)
            .collect()
    }

    fn primary_ranges(&self, endpoint: HostId) -> Vec<TokenRange> {
        self.primary.get(&endpoint).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_only_strategy_is_never_eligible() {
        assert!(!keyspace_eligible_for_repair(
            &ReplicationStrategy::LocalOnly,
            "dc1",
            false,
            false,
            true
        ));
    }

    #[test]
    fn topology_aware_strategy_excludes_dcs_not_replicated_to() {
        let mut rf = HashMap::new();
        rf.insert("dc1".to_string(), 3);
        let strategy = ReplicationStrategy::NetworkTopologyAware {
            replication_factor_per_dc: rf,
        };
        assert!(keyspace_eligible_for_repair(&strategy, "dc1", false, false, true));
        assert!(!keyspace_eligible_for_repair(&strategy, "dc2", false, false, true));
    }

    #[test]
    fn materialized_views_are_excluded_unless_enabled() {
        let strategy = ReplicationStrategy::Simple { replication_factor: 3 };
        assert!(!keyspace_eligible_for_repair(&strategy, "dc1", false, true, false));
        assert!(keyspace_eligible_for_repair(&strategy, "dc1", false, true, true));
    }

    #[test]
    fn trace_keyspace_is_never_eligible() {
        let strategy = ReplicationStrategy::Simple { replication_factor: 3 };
        assert!(!keyspace_eligible_for_repair(&strategy, "dc1", true, false, true));
    }
}
