use thiserror::Error;

/// Failures a `PersistedStateStore` implementation can surface. Anything
/// beyond these is a bug in the implementation, not a condition the core
/// is designed to handle.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("quorum unreachable or request timed out: {0}")]
    Transient(String),

    #[error("row for host {0} not found")]
    RowNotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
