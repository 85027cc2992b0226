//! Error types for taskpulse.

use thiserror::Error;

/// Main error type for the task, analytics and insight layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed caller input.
    #[error("{0}")]
    Validation(String),

    /// A referenced row does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Underlying SQLite read/write failure.
    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The text-generation API failed or replied with something unusable.
    /// Recovered inside the insight generator and never surfaced over HTTP.
    #[error("text generation failed: {0}")]
    ExternalService(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn task_not_found(id: i64) -> Self {
        Self::NotFound(format!("Task {id}"))
    }
}

/// Result type alias for taskpulse.
pub type Result<T> = std::result::Result<T, Error>;
