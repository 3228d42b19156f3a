//! Key-value storage media
//!
//! The activity log persists its whole entry sequence as one text blob under
//! a single key. Backends only need to get, replace and remove blobs.
//!
//! - [`MemoryStore`]: process-local map, optionally capped to mimic a
//!   browser storage quota
//! - [`FileStore`]: one file per key inside a directory

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::fmt::Debug;

use crate::error::StorageError;

/// Synchronous, best-effort key-value persistence
///
/// Implementations must be safe to call from any thread; the log serializes
/// its own access but a backend may be shared between logs.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read the blob stored under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the blob stored under `key`; absent keys are not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
