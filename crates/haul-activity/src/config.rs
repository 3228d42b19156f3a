//! Configuration for the activity log

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ActivityError;

/// Maximum number of entries kept in the log
pub const MAX_ENTRIES: usize = 100;

/// Age after which an entry is removed by a prune pass
pub const EXPIRY_DURATION: Duration = Duration::from_secs(60 * 60);

/// Interval between automatic prune passes
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Storage key holding the serialized entry sequence
pub const STORAGE_KEY: &str = "admin_activities";

/// Actor recorded when the caller does not name one
pub const DEFAULT_ACTOR: &str = "Admin";

/// Default number of entries returned by `recent`
pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// Activity log configuration
///
/// Durations are expressed in whole seconds when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Capacity bound, enforced on every write
    pub capacity: usize,
    /// Entry lifetime, enforced on prune passes
    #[serde(with = "duration_secs")]
    pub expiry: Duration,
    /// How often the background pruner runs
    #[serde(with = "duration_secs")]
    pub prune_interval: Duration,
    /// Key of the blob in the storage medium
    pub storage_key: String,
    /// Actor used when an event carries none
    pub default_actor: String,
    /// Hide expired entries from reads between prune passes
    pub filter_expired_on_read: bool,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_ENTRIES,
            expiry: EXPIRY_DURATION,
            prune_interval: PRUNE_INTERVAL,
            storage_key: STORAGE_KEY.to_string(),
            default_actor: DEFAULT_ACTOR.to_string(),
            filter_expired_on_read: false,
        }
    }
}

impl ActivityConfig {
    /// Set the capacity bound
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the entry lifetime
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = expiry;
        self
    }

    /// Set the prune interval
    pub fn with_prune_interval(mut self, interval: Duration) -> Self {
        self.prune_interval = interval;
        self
    }

    /// Set the storage key
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Set the fallback actor
    pub fn with_default_actor(mut self, actor: impl Into<String>) -> Self {
        self.default_actor = actor.into();
        self
    }

    /// Enable or disable read-time expiry filtering
    pub fn with_filter_expired_on_read(mut self, enabled: bool) -> Self {
        self.filter_expired_on_read = enabled;
        self
    }

    /// Reject configurations the log cannot honor
    pub fn validate(&self) -> Result<(), ActivityError> {
        if self.capacity == 0 {
            return Err(ActivityError::invalid("capacity must be at least 1"));
        }
        if self.expiry.is_zero() {
            return Err(ActivityError::invalid("expiry must be non-zero"));
        }
        if self.prune_interval.is_zero() {
            return Err(ActivityError::invalid("prune interval must be non-zero"));
        }
        if self.storage_key.trim().is_empty() {
            return Err(ActivityError::invalid("storage key must not be empty"));
        }
        Ok(())
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
