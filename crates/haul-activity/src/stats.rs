//! Aggregate counters for dashboard display

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::ActivityEntry;
use crate::kind::{ActivityKind, Severity};

/// Snapshot of log counters, computed fresh on every call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    pub total: usize,
    /// Entries recorded within the trailing hour
    pub last_hour: usize,
    /// Entries recorded within the trailing 24 hours
    pub last_day: usize,
    pub by_kind: BTreeMap<ActivityKind, usize>,
    pub by_severity: BTreeMap<Severity, usize>,
}

impl ActivityStats {
    /// Aggregate `entries` as seen at `now`
    pub fn compute<'a>(entries: impl IntoIterator<Item = &'a ActivityEntry>, now: DateTime<Utc>) -> Self {
        let hour_ago = now - TimeDelta::hours(1);
        let day_ago = now - TimeDelta::days(1);

        let mut stats = Self::default();
        for entry in entries {
            stats.total += 1;
            if entry.occurred_at > hour_ago {
                stats.last_hour += 1;
            }
            if entry.occurred_at > day_ago {
                stats.last_day += 1;
            }
            *stats.by_kind.entry(entry.kind).or_default() += 1;
            *stats.by_severity.entry(entry.severity).or_default() += 1;
        }
        stats
    }

    /// Count for one kind, zero when absent
    pub fn kind_count(&self, kind: ActivityKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }

    /// Count for one severity, zero when absent
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }
}
