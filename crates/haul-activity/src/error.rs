//! Error types for haul-activity
//!
//! Storage errors never leave [`ActivityLog`](crate::ActivityLog); they are
//! absorbed and reported through `tracing`. Only [`ActivityError::InvalidArgument`]
//! is visible to callers of the public recording API.

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::store::KeyValueStore) backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage medium could not be reached (quota, permissions, missing medium)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Stored data exists but cannot be interpreted
    #[error("Storage corrupt: {0}")]
    Corrupt(String),

    /// I/O error while reading or writing a backend
    #[error("I/O error: {0}")]
    Io(String),

    /// Error while encoding entries for storage
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// Decoding failures mean the stored blob is unusable
impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            StorageError::Io(err.to_string())
        } else {
            StorageError::Corrupt(err.to_string())
        }
    }
}

impl StorageError {
    /// Create a new Unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Create a new Corrupt error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt(message.into())
    }

    /// Create a new Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

/// Errors surfaced by the activity log API
#[derive(Debug, Error)]
pub enum ActivityError {
    /// The caller supplied a malformed event or configuration value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A storage failure, only produced by helpers that talk to a backend directly
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ActivityError {
    /// Create a new InvalidArgument error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
