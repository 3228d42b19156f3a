//! # Haul Activity
//!
//! Bounded, self-pruning activity log for the Haul admin dashboard.
//!
//! Dashboard actions (logins, load edits, broker deletions, payouts, ...) are
//! recorded as typed [`ActivityEntry`] values in a newest-first log that is
//! persisted as a JSON array under a single key of a [`KeyValueStore`].
//!
//! ## Features
//!
//! - **ActivityLog**: capacity eviction on every write, age eviction on prune passes
//! - **Kind catalog**: one declarative template per [`ActivityKind`]
//! - **Stats**: totals, trailing hour/day windows, per-kind and per-severity counts
//! - **Storage backends**: [`MemoryStore`] and [`FileStore`]
//! - **PruneTask**: cancelable periodic expiry pass, owned by [`ActivityService`]
//! - **Live feed**: broadcast subscription to new entries
//!
//! Storage failures are absorbed: a failed load starts empty, a failed save
//! keeps the in-memory state. Recording an activity never breaks the action
//! being tracked.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use haul_activity::{ActivityEvent, ActivityKind, ActivityLog, MemoryStore, Severity};
//!
//! let log = ActivityLog::open(Arc::new(MemoryStore::new()));
//!
//! log.record(ActivityEvent::from_template(ActivityKind::LoadCreated, 42, "dispatch"))
//!     .unwrap();
//! log.record(
//!     ActivityEvent::new(ActivityKind::UserLogin, "User Login", "alice logged in")
//!         .with_actor("alice")
//!         .with_severity(Severity::Success),
//! )
//! .unwrap();
//!
//! assert_eq!(log.recent(1)[0].title, "User Login");
//! assert_eq!(log.stats().severity_count(Severity::Success), 2);
//! ```

pub mod clock;
pub mod config;
pub mod entry;
pub mod error;
pub mod kind;
pub mod log;
pub mod pruner;
pub mod service;
pub mod stats;
pub mod store;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    ActivityConfig, DEFAULT_ACTOR, DEFAULT_RECENT_LIMIT, EXPIRY_DURATION, MAX_ENTRIES,
    PRUNE_INTERVAL, STORAGE_KEY,
};
pub use entry::{ActivityEntry, ActivityEvent, Metadata};
pub use error::{ActivityError, StorageError};
pub use kind::{ActivityKind, KindTemplate, Severity, Subject};
pub use log::ActivityLog;
pub use pruner::{PruneTask, PrunerHandle};
pub use service::ActivityService;
pub use stats::ActivityStats;
pub use store::{FileStore, KeyValueStore, MemoryStore};
