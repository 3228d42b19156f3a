//! Tests for command sequences across separate invocations
//!
//! Each invocation reopens the log from the data directory, the way the
//! binary does.

use std::sync::Arc;

use clap::Parser;
use haul_activity::{ActivityConfig, ActivityLog, FileStore, SystemClock};
use haul_cli::{Cli, execute};
use tempfile::TempDir;

fn run(data_dir: &TempDir, args: &[&str]) -> String {
    let mut argv = vec!["haul-activity", "--data-dir"];
    argv.push(data_dir.path().to_str().unwrap());
    argv.extend_from_slice(args);

    let cli = Cli::try_parse_from(argv).unwrap();
    let store = FileStore::open(&cli.data_dir).unwrap();
    let log = ActivityLog::with_options(
        Arc::new(store),
        ActivityConfig::default(),
        Arc::new(SystemClock),
    )
    .unwrap();
    execute(&log, cli.command, cli.json).unwrap()
}

/// Entries recorded in one invocation are listed by the next
#[test]
fn test_records_persist_between_invocations() {
    let data_dir = TempDir::new().unwrap();

    run(&data_dir, &["log", "driver_deactivated", "D-4", "--actor", "ops"]);
    run(&data_dir, &["log", "load-created", "42"]);

    let recent = run(&data_dir, &["recent", "-n", "5"]);
    let lines: Vec<_> = recent.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Load #42 was created by Admin"));
    assert!(lines[1].contains("Driver D-4 was deactivated by ops"));

    let warnings = run(&data_dir, &["by-severity", "warning"]);
    assert!(warnings.contains("Driver Deactivated"));
}

/// Clearing in one invocation empties the log for the next
#[test]
fn test_clear_persists() {
    let data_dir = TempDir::new().unwrap();

    run(&data_dir, &["log", "bid_accepted", "B-3"]);
    run(&data_dir, &["clear"]);

    let stats = run(&data_dir, &["--json", "stats"]);
    let value: serde_json::Value = serde_json::from_str(&stats).unwrap();
    assert_eq!(value["total"], 0);
}

/// The kind catalog is available without any stored data
#[test]
fn test_kinds_json_lists_catalog() {
    let data_dir = TempDir::new().unwrap();

    let kinds = run(&data_dir, &["kinds", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&kinds).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 27);
    assert_eq!(rows[0]["kind"], "user_login");
    assert_eq!(rows[0]["metadataKey"], "userId");
}
