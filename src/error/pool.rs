//! Pool and worker lifecycle error types.

use thiserror::Error;

/// Errors surfaced by the pool supervisor and worker units.
#[derive(Error, Debug)]
pub enum PoolError {
    /// A worker's dispatch task panicked instead of returning cleanly.
    #[error("worker {0} task panicked during shutdown: {1}")]
    WorkerPanicked(usize, String),
}
