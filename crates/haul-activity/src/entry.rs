//! Activity events (what callers submit) and entries (what the log stores)

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ActivityError;
use crate::kind::{ActivityKind, Severity};

/// Caller-supplied context attached to an entry, not interpreted by the log
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// An activity as submitted to [`ActivityLog::record`](crate::ActivityLog::record)
///
/// Build one with [`ActivityEvent::new`] and the `with_*` methods, or from the
/// kind catalog with [`ActivityEvent::from_template`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    /// Falls back to the log's configured default actor when absent
    #[serde(default)]
    pub actor: Option<String>,
    /// Falls back to [`Severity::Info`] when absent
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ActivityEvent {
    /// Create an event with the required fields only
    pub fn new(kind: ActivityKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            actor: None,
            severity: None,
            metadata: Metadata::new(),
        }
    }

    /// Build an event from the kind catalog
    ///
    /// The title and default severity come from [`ActivityKind::template`], the
    /// description has its `{subject}` and `{actor}` placeholders filled, and
    /// the subject id is stored in metadata under the subject's key (for
    /// example `loadId`).
    pub fn from_template(
        kind: ActivityKind,
        subject_id: impl Into<serde_json::Value>,
        actor: impl Into<String>,
    ) -> Self {
        let template = kind.template();
        let subject_id = subject_id.into();
        let actor = actor.into();
        let subject_text = match &subject_id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        let mut metadata = Metadata::new();
        metadata.insert(kind.subject().metadata_key().to_string(), subject_id);

        Self {
            kind,
            title: template.title.to_string(),
            description: template.render(&subject_text, &actor),
            actor: Some(actor),
            severity: Some(template.severity),
            metadata,
        }
    }

    /// Set the acting user
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Set the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Add one metadata value, replacing any previous value for `key`
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check the required fields
    pub fn validate(&self) -> Result<(), ActivityError> {
        if self.title.trim().is_empty() {
            return Err(ActivityError::invalid("title must not be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(ActivityError::invalid("description must not be empty"));
        }
        Ok(())
    }
}

/// A recorded activity
///
/// Entries are immutable once recorded; readers always receive clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Unique within the log
    pub id: String,
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub actor: String,
    /// Assigned by the log, never by the caller
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub severity: Severity,
}

impl ActivityEntry {
    /// Age of the entry relative to `now`, clamped at zero
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        (now - self.occurred_at).max(TimeDelta::zero())
    }

    /// Short label for activity feeds: `just now`, `5m ago`, `3h ago`, `2d ago`
    pub fn relative_time(&self, now: DateTime<Utc>) -> String {
        let age = self.age(now);
        if age < TimeDelta::minutes(1) {
            "just now".to_string()
        } else if age < TimeDelta::hours(1) {
            format!("{}m ago", age.num_minutes())
        } else if age < TimeDelta::days(1) {
            format!("{}h ago", age.num_hours())
        } else {
            format!("{}d ago", age.num_days())
        }
    }
}
