//! Error types for mediaprep.

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),
}

/// Background worker pool errors.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Worker pool is closed")]
    Closed,
}

/// Input-processing subsystem errors.
///
/// These are local to a single task: the pool releases the affected item and
/// keeps serving the rest of the queue.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to create input job: {reason}")]
    CreateFailed { reason: String },

    #[error("Failed to start input job: {reason}")]
    StartFailed { reason: String },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
