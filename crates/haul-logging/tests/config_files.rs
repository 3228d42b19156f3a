//! Tests for loading logging configuration from files
//!
//! Services embed [`LogConfig`] in their TOML config files, so partial tables
//! must fill in defaults and presets must survive a round trip.

use std::path::PathBuf;

use haul_logging::{LogConfig, RotationStrategy};

/// Presets survive JSON serialization unchanged
#[test]
fn test_presets_round_trip_json() {
    for config in [
        LogConfig::default(),
        LogConfig::development(),
        LogConfig::production(PathBuf::from("/var/log/haul")),
        LogConfig::testing(),
    ] {
        let json = serde_json::to_string(&config).unwrap();
        let restored: LogConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}

/// A partial TOML table falls back to defaults for missing fields
#[test]
fn test_partial_toml_uses_defaults() {
    let config: LogConfig = toml::from_str(
        r#"
        default_level = "debug"

        [file]
        directory = "/srv/haul/logs"
        rotation = "hourly"

        [targets]
        haul_activity = "trace"
        "#,
    )
    .unwrap();

    assert_eq!(config.default_level, "debug");
    assert!(config.console.enabled);
    assert!(!config.console.pretty);

    let file = config.file.as_ref().unwrap();
    assert_eq!(file.directory, PathBuf::from("/srv/haul/logs"));
    assert_eq!(file.rotation, RotationStrategy::Hourly);
    assert_eq!(file.prefix, "haul-activity");

    assert_eq!(config.filter_directives(), "debug,haul_activity=trace");
}

/// An empty document is the default configuration
#[test]
fn test_empty_toml_is_default() {
    let config: LogConfig = toml::from_str("").unwrap();
    assert_eq!(config, LogConfig::default());
}

/// Unknown rotation names are rejected
#[test]
fn test_unknown_rotation_rejected() {
    let result: Result<LogConfig, _> = toml::from_str(
        r#"
        [file]
        rotation = "weekly"
        "#,
    );
    assert!(result.is_err());
}
