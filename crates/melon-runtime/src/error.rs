//! Error types for the push runtime.

use thiserror::Error;

/// Errors that can occur while scheduling or delivering pushes.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Scheduler not started.
    #[error("scheduler not started")]
    NotStarted,

    /// Scheduler already started.
    #[error("scheduler already started")]
    AlreadyStarted,

    /// Shutdown error.
    #[error("shutdown error: {0}")]
    Shutdown(String),

    /// Delivering to one destination failed.
    #[error("failed to send to {target}: {reason}")]
    Send { target: i64, reason: String },

    /// A push cycle panicked.
    #[error("push cycle panicked: {0}")]
    Panicked(String),

    /// Fetching or formatting the digest failed.
    #[error(transparent)]
    Core(#[from] melon_core::MelonError),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
