//! State store error types.

use std::fmt;

/// Errors raised by a [`StateStore`](super::StateStore).
#[derive(Debug)]
pub enum StoreError {
    /// SQLite failure (open, query, write).
    Sqlite(rusqlite::Error),
    /// A persisted column could not be decoded.
    Decode { entity: String, error: String },
    /// State could not be encoded for persistence.
    Encode(serde_json::Error),
    /// The blocking task running the query failed.
    Task(String),
    /// Backend rejected the operation for another reason.
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "sqlite error: {}", e),
            StoreError::Decode { entity, error } => {
                write!(f, "corrupt state for '{}': {}", entity, error)
            }
            StoreError::Encode(e) => write!(f, "failed to encode state: {}", e),
            StoreError::Task(msg) => write!(f, "store task failed: {}", msg),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Sqlite(e) => Some(e),
            StoreError::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Encode(e)
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::Task(e.to_string())
    }
}
