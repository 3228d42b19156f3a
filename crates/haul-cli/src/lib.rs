//! Command line access to the Haul admin activity log
//!
//! The binary opens a [`FileStore`](haul_activity::FileStore) in the data
//! directory, runs one [`Command`] against the log and prints the result.

pub mod config;
pub mod output;

use haul_activity::{ActivityEvent, ActivityLog};
use serde_json::json;
use tracing::info;

pub use config::{AppConfig, Cli, Command};

/// Run one command and return the text to print
pub fn execute(log: &ActivityLog, command: Command, as_json: bool) -> anyhow::Result<String> {
    let now = log.now();
    let text = match command {
        Command::Record {
            kind,
            title,
            description,
            actor,
            severity,
            metadata,
        } => {
            let mut event = ActivityEvent::new(kind, title, description);
            event.actor = actor;
            event.severity = severity;
            event.metadata = output::parse_metadata(&metadata)?;
            let entry = log.record(event)?;
            if as_json {
                output::to_json(&entry)?
            } else {
                output::format_entry(&entry, now)
            }
        }
        Command::Log {
            kind,
            subject,
            actor,
        } => {
            let actor = actor.unwrap_or_else(|| log.config().default_actor.clone());
            let entry = log.record(ActivityEvent::from_template(kind, subject, actor))?;
            if as_json {
                output::to_json(&entry)?
            } else {
                output::format_entry(&entry, now)
            }
        }
        Command::Recent { limit } => entries_output(&log.recent(limit), now, as_json)?,
        Command::ByKind { kind } => entries_output(&log.by_kind(kind), now, as_json)?,
        Command::BySeverity { severity } => {
            entries_output(&log.by_severity(severity), now, as_json)?
        }
        Command::Stats => {
            let stats = log.stats();
            if as_json {
                output::to_json(&stats)?
            } else {
                output::format_stats(&stats)
            }
        }
        Command::Prune => {
            let removed = log.prune_expired();
            info!(removed, "Manual prune complete");
            if as_json {
                output::to_json(&json!({ "removed": removed }))?
            } else {
                format!("Removed {removed} expired entries")
            }
        }
        Command::Clear => {
            log.clear_all();
            if as_json {
                output::to_json(&json!({ "cleared": true }))?
            } else {
                "Activity log cleared".to_string()
            }
        }
        Command::Kinds => {
            if as_json {
                let kinds: Vec<_> = haul_activity::ActivityKind::ALL
                    .iter()
                    .map(|kind| {
                        let template = kind.template();
                        json!({
                            "kind": kind,
                            "title": template.title,
                            "severity": template.severity,
                            "metadataKey": kind.subject().metadata_key(),
                        })
                    })
                    .collect();
                output::to_json(&kinds)?
            } else {
                output::format_kinds()
            }
        }
    };
    Ok(text)
}

fn entries_output(
    entries: &[haul_activity::ActivityEntry],
    now: chrono::DateTime<chrono::Utc>,
    as_json: bool,
) -> anyhow::Result<String> {
    if as_json {
        output::to_json(entries)
    } else {
        Ok(output::format_entries(entries, now))
    }
}
