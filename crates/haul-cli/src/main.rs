use std::sync::Arc;

use clap::Parser;
use haul_activity::{ActivityLog, FileStore, SystemClock};
use haul_cli::{AppConfig, Cli, execute};
use haul_logging::HaulSubscriberBuilder;
use tracing::debug;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Set up logging
    let mut builder = HaulSubscriberBuilder::new().with_config(config.logging);
    if let Some(level) = &cli.log_level {
        builder = builder.with_level(level);
    }
    if cli.pretty {
        builder = builder.with_pretty(true);
    }
    let _guard = builder.init();

    let store = FileStore::open(&cli.data_dir)?;
    debug!(data_dir = %cli.data_dir.display(), "Opened activity store");

    let log = ActivityLog::with_options(Arc::new(store), config.activity, Arc::new(SystemClock))?;
    let text = execute(&log, cli.command, cli.json)?;
    println!("{text}");

    Ok(())
}
