//! The bounded, self-pruning activity log
//!
//! Entries are kept newest first. Two independent eviction policies apply:
//!
//! - **Capacity**: every [`record`](ActivityLog::record) truncates the log to
//!   `capacity` entries by dropping the oldest.
//! - **Age**: [`prune_expired`](ActivityLog::prune_expired) drops entries older
//!   than `expiry`. It runs when the log is opened and on the background
//!   pruner's interval, not on every read.
//!
//! Between prune passes reads may return entries older than `expiry` unless
//! `filter_expired_on_read` is enabled.
//!
//! Storage failures never reach the caller. A failed load starts an empty log;
//! a failed save keeps the in-memory state and logs a warning.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::ActivityConfig;
use crate::entry::{ActivityEntry, ActivityEvent};
use crate::error::{ActivityError, StorageError};
use crate::kind::{ActivityKind, Severity};
use crate::stats::ActivityStats;
use crate::store::KeyValueStore;

/// Buffer size of the live feed channel
const FEED_CAPACITY: usize = 64;

/// Capacity- and time-bounded activity log persisted to a [`KeyValueStore`]
///
/// Shared via `Arc<ActivityLog>`; all operations take `&self` and serialize
/// on a single internal mutex.
pub struct ActivityLog {
    config: ActivityConfig,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    /// Newest first
    entries: Mutex<VecDeque<ActivityEntry>>,
    feed: broadcast::Sender<ActivityEntry>,
}

impl std::fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLog")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("len", &self.entries.lock().len())
            .finish()
    }
}

impl ActivityLog {
    /// Open a log with the default configuration and the system clock
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        Self::load(store, ActivityConfig::default(), Arc::new(SystemClock))
    }

    /// Open a log with a custom configuration and clock
    ///
    /// Fails only when `config` is invalid; storage problems yield an empty log.
    pub fn with_options(
        store: Arc<dyn KeyValueStore>,
        config: ActivityConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ActivityError> {
        config.validate()?;
        Ok(Self::load(store, config, clock))
    }

    fn load(store: Arc<dyn KeyValueStore>, config: ActivityConfig, clock: Arc<dyn Clock>) -> Self {
        let mut entries = match read_entries(store.as_ref(), &config.storage_key) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    error = %e,
                    key = %config.storage_key,
                    "Failed to load activity log, starting empty"
                );
                VecDeque::new()
            }
        };
        entries.truncate(config.capacity);

        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        let log = Self {
            config,
            store,
            clock,
            entries: Mutex::new(entries),
            feed,
        };

        let removed = log.prune_expired();
        debug!(
            entries = log.len(),
            pruned = removed,
            key = %log.config.storage_key,
            "Activity log opened"
        );
        log
    }

    /// Record an activity
    ///
    /// Assigns the id and timestamp, prepends the entry, evicts beyond
    /// capacity and persists. Only a malformed event is an error; persistence
    /// failures are logged and swallowed.
    #[instrument(skip_all, fields(kind = %event.kind))]
    pub fn record(&self, event: ActivityEvent) -> Result<ActivityEntry, ActivityError> {
        event.validate()?;

        let mut entries = self.entries.lock();
        let now = self.clock.now();
        // Keep insertion order non-decreasing in time if the wall clock steps back
        let occurred_at = match entries.front() {
            Some(newest) if newest.occurred_at > now => newest.occurred_at,
            _ => now,
        };

        let actor = event
            .actor
            .filter(|actor| !actor.trim().is_empty())
            .unwrap_or_else(|| self.config.default_actor.clone());

        let entry = ActivityEntry {
            id: Uuid::new_v4().to_string(),
            kind: event.kind,
            title: event.title,
            description: event.description,
            actor,
            occurred_at,
            metadata: event.metadata,
            severity: event.severity.unwrap_or_default(),
        };

        entries.push_front(entry.clone());
        let evicted = entries.len().saturating_sub(self.config.capacity);
        entries.truncate(self.config.capacity);
        self.persist(&entries);
        drop(entries);

        // No subscribers is not an error
        let _ = self.feed.send(entry.clone());

        debug!(id = %entry.id, evicted, "Recorded activity");
        Ok(entry)
    }

    /// The `limit` most recent entries, newest first
    pub fn recent(&self, limit: usize) -> Vec<ActivityEntry> {
        let cutoff = self.read_cutoff();
        self.entries
            .lock()
            .iter()
            .filter(|entry| is_live(entry, cutoff))
            .take(limit)
            .cloned()
            .collect()
    }

    /// All entries of one kind, in log order
    pub fn by_kind(&self, kind: ActivityKind) -> Vec<ActivityEntry> {
        self.filtered(|entry| entry.kind == kind)
    }

    /// All entries of one severity, in log order
    pub fn by_severity(&self, severity: Severity) -> Vec<ActivityEntry> {
        self.filtered(|entry| entry.severity == severity)
    }

    /// Every entry, in log order
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.filtered(|_| true)
    }

    /// Aggregate counters over the current entries
    pub fn stats(&self) -> ActivityStats {
        let now = self.clock.now();
        let cutoff = self.read_cutoff();
        let entries = self.entries.lock();
        ActivityStats::compute(entries.iter().filter(|entry| is_live(entry, cutoff)), now)
    }

    /// Remove every entry and persist the empty log
    pub fn clear_all(&self) {
        let mut entries = self.entries.lock();
        let removed = entries.len();
        entries.clear();
        self.persist(&entries);
        info!(removed, "Cleared activity log");
    }

    /// Remove entries older than the configured expiry
    ///
    /// Returns the number of removed entries. The log is persisted only when
    /// something was removed.
    pub fn prune_expired(&self) -> usize {
        let cutoff = expiry_cutoff(self.clock.now(), &self.config);
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|entry| is_live(entry, Some(cutoff)));
        let removed = before - entries.len();

        if removed > 0 {
            self.persist(&entries);
            info!(removed, remaining = entries.len(), "Pruned expired activities");
        }
        removed
    }

    /// Subscribe to entries as they are recorded
    ///
    /// Slow receivers observe `RecvError::Lagged` once the buffer overflows.
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEntry> {
        self.feed.subscribe()
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check whether the log holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// The configuration the log was opened with
    pub fn config(&self) -> &ActivityConfig {
        &self.config
    }

    /// Current time according to the log's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn filtered(&self, predicate: impl Fn(&ActivityEntry) -> bool) -> Vec<ActivityEntry> {
        let cutoff = self.read_cutoff();
        self.entries
            .lock()
            .iter()
            .filter(|&entry| is_live(entry, cutoff) && predicate(entry))
            .cloned()
            .collect()
    }

    fn read_cutoff(&self) -> Option<DateTime<Utc>> {
        self.config
            .filter_expired_on_read
            .then(|| expiry_cutoff(self.clock.now(), &self.config))
    }

    fn persist(&self, entries: &VecDeque<ActivityEntry>) {
        let result = serde_json::to_string(entries)
            .map_err(|e| StorageError::serialization(e.to_string()))
            .and_then(|blob| self.store.set(&self.config.storage_key, &blob));

        if let Err(e) = result {
            warn!(
                error = %e,
                key = %self.config.storage_key,
                entries = entries.len(),
                "Failed to persist activity log, keeping in-memory state"
            );
        }
    }
}

fn read_entries(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<VecDeque<ActivityEntry>, StorageError> {
    match store.get(key)? {
        Some(blob) if !blob.trim().is_empty() => Ok(serde_json::from_str(&blob)?),
        _ => Ok(VecDeque::new()),
    }
}

/// Instant at or before which an entry counts as expired
fn expiry_cutoff(now: DateTime<Utc>, config: &ActivityConfig) -> DateTime<Utc> {
    let expiry = TimeDelta::from_std(config.expiry).unwrap_or(TimeDelta::MAX);
    now.checked_sub_signed(expiry)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn is_live(entry: &ActivityEntry, cutoff: Option<DateTime<Utc>>) -> bool {
    cutoff.is_none_or(|cutoff| entry.occurred_at > cutoff)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;

    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;

    /// Backend whose every operation fails
    #[derive(Debug)]
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::unavailable("storage disabled"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::unavailable("quota exceeded"))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::unavailable("storage disabled"))
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn create_test_log() -> (ActivityLog, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(start()));
        let log = ActivityLog::with_options(store.clone(), ActivityConfig::default(), clock.clone())
            .unwrap();
        (log, store, clock)
    }

    fn event(title: &str) -> ActivityEvent {
        ActivityEvent::new(ActivityKind::LoadUpdated, title, format!("{title} happened"))
    }

    #[test]
    fn test_record_assigns_id_time_and_defaults() {
        let (log, _store, clock) = create_test_log();

        let entry = log.record(event("Load Updated")).unwrap();
        assert!(!entry.id.is_empty());
        assert_eq!(entry.occurred_at, clock.now());
        assert_eq!(entry.actor, "Admin");
        assert_eq!(entry.severity, Severity::Info);
    }

    #[test]
    fn test_record_persists_json_array() {
        let (log, store, _clock) = create_test_log();
        log.record(event("first")).unwrap();
        log.record(event("second")).unwrap();

        let blob = store.get("admin_activities").unwrap().unwrap();
        let stored: Vec<ActivityEntry> = serde_json::from_str(&blob).unwrap();
        let titles: Vec<_> = stored.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_invalid_event_is_rejected_and_not_stored() {
        let (log, store, _clock) = create_test_log();
        let err = log
            .record(ActivityEvent::new(ActivityKind::UserLogin, "", "x"))
            .unwrap_err();
        assert!(matches!(err, ActivityError::InvalidArgument(_)));
        assert!(log.is_empty());
        assert_eq!(store.get("admin_activities").unwrap(), None);
    }

    #[test]
    fn test_blank_actor_falls_back_to_default() {
        let (log, _store, _clock) = create_test_log();
        let entry = log.record(event("x").with_actor("   ")).unwrap();
        assert_eq!(entry.actor, "Admin");
    }

    #[test]
    fn test_ids_are_unique() {
        let (log, _store, _clock) = create_test_log();
        let mut ids: Vec<_> = (0..50)
            .map(|i| log.record(event(&format!("e{i}"))).unwrap().id)
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_timestamps_never_go_backwards() {
        let (log, _store, clock) = create_test_log();
        let first = log.record(event("first")).unwrap();
        clock.set(start() - TimeDelta::minutes(10));
        let second = log.record(event("second")).unwrap();
        assert!(second.occurred_at >= first.occurred_at);
    }

    #[test]
    fn test_capacity_eviction_drops_oldest() {
        let store = Arc::new(MemoryStore::new());
        let config = ActivityConfig::default().with_capacity(3);
        let log = ActivityLog::with_options(store, config, Arc::new(ManualClock::new(start())))
            .unwrap();

        for i in 1..=5 {
            log.record(event(&format!("Event {i}"))).unwrap();
        }

        let titles: Vec<_> = log.entries().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Event 5", "Event 4", "Event 3"]);
    }

    #[test]
    fn test_recent_limits() {
        let (log, _store, _clock) = create_test_log();
        assert!(log.recent(5).is_empty());

        for i in 0..3 {
            log.record(event(&format!("e{i}"))).unwrap();
        }
        assert_eq!(log.recent(2).len(), 2);
        assert_eq!(log.recent(10).len(), 3);
        assert!(log.recent(0).is_empty());
    }

    #[test]
    fn test_by_kind_and_severity_keep_log_order() {
        let (log, _store, _clock) = create_test_log();
        log.record(ActivityEvent::from_template(ActivityKind::DriverCreated, 1, "ops"))
            .unwrap();
        log.record(ActivityEvent::from_template(ActivityKind::LoadDeleted, 2, "ops"))
            .unwrap();
        log.record(ActivityEvent::from_template(ActivityKind::DriverCreated, 3, "ops"))
            .unwrap();

        let drivers = log.by_kind(ActivityKind::DriverCreated);
        assert_eq!(drivers.len(), 2);
        assert_eq!(drivers[0].metadata["driverId"], 3);
        assert_eq!(drivers[1].metadata["driverId"], 1);

        let warnings = log.by_severity(Severity::Warning);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ActivityKind::LoadDeleted);
    }

    #[test]
    fn test_prune_removes_only_expired() {
        let (log, _store, clock) = create_test_log();
        log.record(event("old")).unwrap();
        clock.advance(Duration::from_secs(50 * 60));
        log.record(event("fresh")).unwrap();
        clock.advance(Duration::from_secs(15 * 60));

        assert_eq!(log.prune_expired(), 1);
        assert_eq!(log.prune_expired(), 0);
        let titles: Vec<_> = log.entries().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["fresh"]);
    }

    #[test]
    fn test_entry_exactly_at_expiry_is_pruned() {
        let (log, _store, clock) = create_test_log();
        log.record(event("edge")).unwrap();
        clock.advance(Duration::from_secs(60 * 60));
        assert_eq!(log.prune_expired(), 1);
    }

    #[test]
    fn test_reads_are_lazy_by_default() {
        let (log, _store, clock) = create_test_log();
        log.record(event("stale")).unwrap();
        clock.advance(Duration::from_secs(2 * 60 * 60));

        assert_eq!(log.recent(20).len(), 1);
        assert_eq!(log.stats().total, 1);
    }

    #[test]
    fn test_filter_expired_on_read() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(start()));
        let config = ActivityConfig::default().with_filter_expired_on_read(true);
        let log = ActivityLog::with_options(store, config, clock.clone()).unwrap();

        log.record(event("stale")).unwrap();
        clock.advance(Duration::from_secs(2 * 60 * 60));
        log.record(event("fresh")).unwrap();

        let titles: Vec<_> = log.recent(20).into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["fresh"]);
        assert_eq!(log.by_kind(ActivityKind::LoadUpdated).len(), 1);
        assert_eq!(log.stats().total, 1);
        // Still held until a prune pass runs
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_open_prunes_persisted_expired_entries() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(start()));
        {
            let log =
                ActivityLog::with_options(store.clone(), ActivityConfig::default(), clock.clone())
                    .unwrap();
            log.record(event("yesterday")).unwrap();
        }

        clock.advance(Duration::from_secs(24 * 60 * 60));
        let log = ActivityLog::with_options(store.clone(), ActivityConfig::default(), clock)
            .unwrap();
        assert!(log.is_empty());
        assert_eq!(store.get("admin_activities").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_open_truncates_oversized_blob() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(start()));
        {
            let log =
                ActivityLog::with_options(store.clone(), ActivityConfig::default(), clock.clone())
                    .unwrap();
            for i in 0..10 {
                log.record(event(&format!("e{i}"))).unwrap();
            }
        }

        let config = ActivityConfig::default().with_capacity(4);
        let log = ActivityLog::with_options(store, config, clock).unwrap();
        assert_eq!(log.len(), 4);
        assert_eq!(log.recent(1)[0].title, "e9");
    }

    #[test]
    fn test_corrupt_blob_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set("admin_activities", "{not json").unwrap();

        let log = ActivityLog::open(store);
        assert!(log.is_empty());
    }

    #[test]
    fn test_wrong_shape_blob_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set("admin_activities", r#"{"id": 1}"#).unwrap();

        let log = ActivityLog::open(store);
        assert!(log.is_empty());
    }

    #[test]
    fn test_broken_storage_never_fails_caller() {
        let log = ActivityLog::open(Arc::new(BrokenStore));
        assert!(log.is_empty());

        let entry = log.record(event("kept in memory")).unwrap();
        assert_eq!(log.recent(1), vec![entry]);

        log.clear_all();
        assert!(log.is_empty());
    }

    #[test]
    fn test_quota_failure_keeps_memory_state() {
        let store = Arc::new(MemoryStore::with_quota(64));
        let log = ActivityLog::with_options(
            store.clone(),
            ActivityConfig::default(),
            Arc::new(ManualClock::new(start())),
        )
        .unwrap();

        log.record(event("too big for the quota")).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(store.get("admin_activities").unwrap(), None);
    }

    #[test]
    fn test_clear_all_is_idempotent_and_persisted() {
        let (log, store, _clock) = create_test_log();
        log.record(event("x")).unwrap();

        log.clear_all();
        log.clear_all();
        assert!(log.is_empty());
        assert_eq!(store.get("admin_activities").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_custom_storage_key() {
        let store = Arc::new(MemoryStore::new());
        let config = ActivityConfig::default().with_storage_key("broker_activities");
        let log = ActivityLog::with_options(store.clone(), config, Arc::new(SystemClock)).unwrap();
        log.record(event("x")).unwrap();

        assert!(store.get("broker_activities").unwrap().is_some());
        assert!(store.get("admin_activities").unwrap().is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = ActivityLog::with_options(
            Arc::new(MemoryStore::new()),
            ActivityConfig::default().with_capacity(0),
            Arc::new(SystemClock),
        );
        assert!(matches!(result, Err(ActivityError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_subscribers_receive_recorded_entries() {
        let (log, _store, _clock) = create_test_log();
        let mut rx = log.subscribe();

        let recorded = log
            .record(ActivityEvent::from_template(ActivityKind::BidAccepted, 77, "alice"))
            .unwrap();

        let received = rx.recv().await.expect("should receive the entry");
        assert_eq!(received, recorded);
    }
}
