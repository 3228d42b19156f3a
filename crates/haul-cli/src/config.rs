use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use haul_activity::{ActivityConfig, ActivityKind, DEFAULT_RECENT_LIMIT, Severity};
use haul_logging::LogConfig;
use serde::{Deserialize, Serialize};

/// Contents of the optional `--config` file
///
/// ```toml
/// [activity]
/// capacity = 100
/// expiry = 3600
///
/// [logging]
/// default_level = "info"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub activity: ActivityConfig,
    pub logging: LogConfig,
}

impl AppConfig {
    /// Read and validate a TOML config file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.activity.validate()?;
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[derive(Parser)]
#[command(name = "haul-activity", about = "Inspect and record Haul admin activity")]
pub struct Cli {
    /// Directory holding the persisted log
    #[arg(long, global = true, default_value = "./haul-data")]
    pub data_dir: PathBuf,

    /// TOML file with [activity] and [logging] tables
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Human-readable log output on stderr
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record an activity with an explicit title and description
    Record {
        /// Activity kind, e.g. load_created
        kind: ActivityKind,
        /// Short headline
        title: String,
        /// Human-readable sentence
        description: String,
        /// Acting user (defaults to the configured actor)
        #[arg(long)]
        actor: Option<String>,
        /// Severity (info, success, warning, error)
        #[arg(long)]
        severity: Option<Severity>,
        /// Metadata as key=value; values that parse as JSON keep their type
        #[arg(long = "meta", value_name = "KEY=VALUE")]
        metadata: Vec<String>,
    },
    /// Record an activity from the kind catalog
    Log {
        /// Activity kind, e.g. broker_deleted
        kind: ActivityKind,
        /// Id of the object acted on
        subject: String,
        /// Acting user (defaults to the configured actor)
        #[arg(long)]
        actor: Option<String>,
    },
    /// Show the newest entries
    Recent {
        /// Maximum number of entries
        #[arg(long, short = 'n', default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
    /// Show entries of one kind
    ByKind {
        kind: ActivityKind,
    },
    /// Show entries of one severity
    BySeverity {
        severity: Severity,
    },
    /// Show summary counters
    Stats,
    /// Remove expired entries now
    Prune,
    /// Remove every entry
    Clear,
    /// List the kind catalog
    Kinds,
}
