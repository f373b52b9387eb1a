use anyhow::Result;
use clap::Parser;
use tracing::{debug, error, info};

use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_cli_settings};

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();

    let loaded = load_cli_settings(&cli).await?;
    let settings = loaded.settings;
    let level = cli.log_level.as_deref().unwrap_or(&settings.log.level);
    init_logging(level, cli.debug, cli.json_logs || settings.log.json)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_HASH"),
        built = env!("BUILD_DATE"),
        "starting authgate"
    );
    debug!(
        checksum = %loaded.snapshot.checksum().as_str(),
        sources = loaded.snapshot.provenance().len(),
        "configuration loaded"
    );

    match dispatch(&cli, &settings).await {
        Ok(()) => Ok(()),
        Err(err) => {
            error!("Command failed: {}", err);
            Err(err)
        }
    }
}
