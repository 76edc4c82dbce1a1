//! Error types for pool operations.

use thiserror::Error;

/// Result type alias for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors that can occur while leasing or releasing resources.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Caller-supplied arguments are out of range. Nothing was read or changed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The available/leased partition would be broken. Always a bug.
    #[error("pool invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid pool configuration: {0}")]
    Config(String),

    #[error("release scheduler is not running")]
    SchedulerClosed,
}
