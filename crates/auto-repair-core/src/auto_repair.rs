//! The facade an external executor actually drives: ask `turn_for`, and
//! only on a `MY_TURN*` answer, pull the bounded assignment stream from
//! `plan`. Wires together exactly the data flow in the component table —
//! Config + Ring View + Persisted State -> Turn Arbitrator -> (if
//! MY_TURN) Assignment Splitter -> ordered assignment stream -> external
//! executor — without the splitter ever consulting the arbitrator
//! directly, matching the "splitter consults the size oracle and
//! replication topology but not the arbitrator" rule.

use auto_repair_sdk::{EpochMillis, HostId, RepairType};

use crate::arbitrator::{TurnArbitrator, TurnDecision};
use crate::assignment::KeyspacePlan;
use crate::config::RepairConfig;
use crate::error::AutoRepairResult;
use crate::splitter::{AssignmentPlanIter, AssignmentSplitter};

/// The single entry point external executors are expected to hold one of
/// per process: one `RepairCoordinator` wraps one `TurnArbitrator` and one
/// `AssignmentSplitter`, both already wired to their store/ring/topology/
/// size-oracle dependencies.
pub struct RepairCoordinator {
    arbitrator: TurnArbitrator,
    splitter: AssignmentSplitter,
}

impl RepairCoordinator {
    pub fn new(arbitrator: TurnArbitrator, splitter: AssignmentSplitter) -> Self {
        Self { arbitrator, splitter }
    }

    /// §4.4's public contract, called once per scheduling tick per
    /// `RepairType`.
    pub fn turn_for(&self, repair_type: RepairType, my_host_id: HostId) -> TurnDecision {
        self.arbitrator.turn_for(repair_type, my_host_id)
    }

    /// §4.5's start write. Callers invoke this exactly once, after
    /// `turn_for` returns a `MY_TURN*` variant and before executing.
    pub fn record_start(
        &self,
        repair_type: RepairType,
        host_id: HostId,
        now: EpochMillis,
        turn: TurnDecision,
    ) -> AutoRepairResult<()> {
        self.arbitrator.record_start(repair_type, host_id, now, turn)
    }

    /// §4.5's finish write, invoked exactly once on completion (success or
    /// failure) regardless of which `MY_TURN*` variant started it.
    pub fn record_finish(&self, repair_type: RepairType, host_id: HostId, now: EpochMillis) -> AutoRepairResult<()> {
        self.arbitrator.record_finish(repair_type, host_id, now)
    }

    /// §4.6's public contract. `primary_range_only` should be `false` for
    /// `MY_TURN_FORCE_REPAIR` (forced cycles also repair non-primary
    /// ranges) and `true` for the other `MY_TURN*` variants.
    pub fn plan(
        &self,
        repair_type: RepairType,
        my_host_id: HostId,
        primary_range_only: bool,
        plans: Vec<KeyspacePlan>,
        config: RepairConfig,
    ) -> AssignmentPlanIter<'_> {
        self.splitter.plan(repair_type, my_host_id, primary_range_only, plans, config)
    }
}

/// `primary_range_only` for a given turn decision: forced cycles repair
/// non-primary ranges too, everything else sticks to primary ranges.
pub fn primary_range_only_for(turn: TurnDecision) -> bool {
    !matches!(turn, TurnDecision::MyTurnForceRepair)
}
