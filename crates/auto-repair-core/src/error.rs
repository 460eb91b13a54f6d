use thiserror::Error;

/// The error taxonomy shared by arbitration and assignment planning.
#[derive(Debug, Error)]
pub enum AutoRepairError {
    /// Quorum unreachable, timeout, network. Retried with backoff by the
    /// caller; if retries are exhausted the enclosing arbitration tick
    /// simply yields `NOT_MY_TURN`, it does not propagate this variant.
    #[error("transient store error: {0}")]
    TransientStore(#[from] auto_repair_store::StoreError),

    /// Ring view refers to a host with no resolvable address, or a
    /// history row is missing an expected field. The affected record is
    /// skipped, not fatal.
    #[error("inconsistent state: {0}")]
    InconsistentState(String),

    /// A table was dropped between planning steps.
    #[error("table {keyspace}.{table} disappeared mid-plan")]
    MissingTable { keyspace: String, table: String },

    /// No splitter available for the current partitioner; the range is
    /// treated as a single assignment instead.
    #[error("partitioner does not support splitting range")]
    PartitionerNotSplittable,

    /// Rejected at configuration time, never surfaced during planning.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Aborts the plan; surfaced to the caller.
    #[error("invariant violated: {0}")]
    FatalInvariant(String),
}

pub type AutoRepairResult<T> = Result<T, AutoRepairError>;
