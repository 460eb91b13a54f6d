use auto_repair_sdk::TokenRange;

/// One unit of repair work: a single range, a keyspace, and the table(s)
/// covering it. Multiple tables only appear together when keyspace
/// batching merged several single-range, sub-budget tables into one
/// assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SizedRepairAssignment {
    pub keyspace: String,
    pub tables: Vec<String>,
    pub range: TokenRange,
    pub estimated_bytes: u64,
    pub description: String,
}

impl SizedRepairAssignment {
    pub fn is_batched(&self) -> bool {
        self.tables.len() > 1
    }
}

/// The per-keyspace, per-priority-bucket unit the plan emits one of, per
/// step of the splitter's iteration. An empty `assignments` vector is not
/// an error: it is the sentinel meaning the schedule-wide byte budget was
/// already exhausted before this keyspace/bucket pair was reached, so the
/// caller still advances priority-bucket bookkeeping without doing work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyspaceRepairAssignments {
    pub priority_bucket: u32,
    pub keyspace: String,
    pub assignments: Vec<SizedRepairAssignment>,
}

impl KeyspaceRepairAssignments {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.assignments.iter().map(|a| a.estimated_bytes).sum()
    }
}

/// One input row to the splitter: the tables of one keyspace, to be
/// planned together, at a given priority bucket (lower runs first).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyspacePlan {
    pub priority_bucket: u32,
    pub keyspace: String,
    pub tables: Vec<String>,
}
