//! Worker pool error types.

use thiserror::Error;

/// Contract violations on pool selection and mutation.
///
/// Rejected renders are not errors; they are counted as failures by the
/// worker that rejected them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("worker pool {0} has no workers")]
    EmptyPool(String),

    #[error("cannot remove {requested} workers from pool {pool}: only {available} present")]
    InsufficientWorkers {
        pool: String,
        requested: usize,
        available: usize,
    },
}

pub type PoolResult<T> = Result<T, PoolError>;
