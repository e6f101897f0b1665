//! Error types for the persistence layer.

use thiserror::Error;

/// Main error type for storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite or storage-thread failures
    #[error("Database error: {0}")]
    Database(String),

    /// Universe document (de)serialization failures
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No row for the requested id
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A versioned write lost the race; the caller should reload
    #[error("Write conflict: {0}")]
    Conflict(String),
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    #[must_use]
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound(resource.into())
    }

    #[must_use]
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
