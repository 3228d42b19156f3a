//! In-memory storage backend
//!
//! Suitable for tests and for sessions that do not need to survive a restart.

use dashmap::DashMap;
use tracing::trace;

use super::KeyValueStore;
use crate::error::StorageError;

/// In-memory implementation of [`KeyValueStore`]
///
/// An optional byte quota rejects writes whose total stored size would exceed
/// it, the same way a browser's local storage rejects writes past its quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: DashMap<String, String>,
    max_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding at most `max_bytes` of keys and values
    pub fn with_quota(max_bytes: usize) -> Self {
        Self {
            values: DashMap::new(),
            max_bytes: Some(max_bytes),
        }
    }

    /// Total bytes currently stored (keys plus values)
    pub fn used_bytes(&self) -> usize {
        self.values
            .iter()
            .map(|entry| entry.key().len() + entry.value().len())
            .sum()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).map(|value| value.clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(max_bytes) = self.max_bytes {
            let replaced = self
                .values
                .get(key)
                .map(|old| key.len() + old.len())
                .unwrap_or(0);
            let projected = self.used_bytes() - replaced + key.len() + value.len();
            if projected > max_bytes {
                return Err(StorageError::unavailable(format!(
                    "quota exceeded: {projected} of {max_bytes} bytes"
                )));
            }
        }

        trace!(key, bytes = value.len(), "Storing value");
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}
