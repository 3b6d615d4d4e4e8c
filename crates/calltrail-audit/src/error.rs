//! Error types for the audit crate.

use thiserror::Error;

/// Errors that can occur during audit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The sink could not persist a record.
    #[error("failed to persist audit record: {0}")]
    Persistence(String),

    /// A required record field was never set.
    #[error("audit record is missing required field '{0}'")]
    IncompleteRecord(&'static str),

    /// A record field holds an invalid value.
    #[error("invalid audit record: {0}")]
    InvalidRecord(String),

    /// Sink configuration is unusable.
    #[error("invalid audit configuration: {0}")]
    Configuration(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
