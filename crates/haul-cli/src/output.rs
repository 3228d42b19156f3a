//! Rendering of entries and stats for the terminal

use std::fmt::Write;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use haul_activity::{ActivityEntry, ActivityKind, ActivityStats, Metadata};
use serde::Serialize;

/// Parse `key=value` pairs; values that are valid JSON keep their JSON type
pub fn parse_metadata(pairs: &[String]) -> anyhow::Result<Metadata> {
    let mut metadata = Metadata::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("metadata must be KEY=VALUE, got {pair:?}");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("metadata key must not be empty in {pair:?}");
        }
        let value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        metadata.insert(key.to_string(), value);
    }
    Ok(metadata)
}

/// One feed line: `severity  title: description (actor, 5m ago)`
pub fn format_entry(entry: &ActivityEntry, now: DateTime<Utc>) -> String {
    format!(
        "{:<8}{}: {} ({}, {})",
        entry.severity.as_str(),
        entry.title,
        entry.description,
        entry.actor,
        entry.relative_time(now)
    )
}

/// Feed lines for a list of entries, or a placeholder when empty
pub fn format_entries(entries: &[ActivityEntry], now: DateTime<Utc>) -> String {
    if entries.is_empty() {
        return "No activity".to_string();
    }
    entries
        .iter()
        .map(|entry| format_entry(entry, now))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line summary of the counters
pub fn format_stats(stats: &ActivityStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total:     {}", stats.total);
    let _ = writeln!(out, "Last hour: {}", stats.last_hour);
    let _ = writeln!(out, "Last day:  {}", stats.last_day);

    if !stats.by_severity.is_empty() {
        let _ = writeln!(out, "By severity:");
        for (severity, count) in &stats.by_severity {
            let _ = writeln!(out, "  {:<20}{}", severity.as_str(), count);
        }
    }
    if !stats.by_kind.is_empty() {
        let _ = writeln!(out, "By kind:");
        for (kind, count) in &stats.by_kind {
            let _ = writeln!(out, "  {:<20}{}", kind.as_str(), count);
        }
    }
    out.trim_end().to_string()
}

/// Catalog listing, one kind per line
pub fn format_kinds() -> String {
    ActivityKind::ALL
        .iter()
        .map(|kind| {
            let template = kind.template();
            format!(
                "{:<20}{:<8}{}",
                kind.as_str(),
                template.severity.as_str(),
                template.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty-printed JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("serializing output")
}
