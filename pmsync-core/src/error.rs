//! Error types for the sync core.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur in sync core operations.
#[derive(Error, Debug)]
pub enum PmSyncError {
    #[error("Invalid task: {0}")]
    Validation(String),

    #[error("Invalid collection path '{0}': expected <owner>/<calendar>")]
    PathInvalid(String),

    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Calendar not found: {0}")]
    CollectionNotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Calendar already exists: {0}")]
    AlreadyExists(String),

    /// A store failure that may succeed when retried.
    #[error("Transient store error: {0}")]
    Transient(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PmSyncError {
    /// Whether the engine may retry the operation that produced this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, PmSyncError::Transient(_) | PmSyncError::Io(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PmSyncError::CollectionNotFound(_) | PmSyncError::EventNotFound(_)
        )
    }
}

impl From<serde_json::Error> for PmSyncError {
    fn from(e: serde_json::Error) -> Self {
        PmSyncError::Serialization(e.to_string())
    }
}

/// Result type alias for sync core operations.
pub type PmSyncResult<T> = Result<T, PmSyncError>;
