//! Error types for checker backends

use thiserror::Error;

/// A checker that cannot be brought up at all.
///
/// Per-comparison problems are never errors; they surface as
/// [`Verdict::Errored`](crate::Verdict::Errored).
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("Checker not found: {0}")]
    NotFound(String),

    #[error("Checker is not runnable: {0}")]
    NotRunnable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CheckerError>;
