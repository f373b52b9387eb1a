use anyhow::{Context, Result};
use authgate_config::errors::ConfigError;
use authgate_keys::errors::KeyError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{load_settings, LoadedSettings};

use super::env::CliArgs;

/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_logging(level: &str, debug: bool, json: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .context("failed to install log subscriber")?;
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .context("failed to install log subscriber")?;
    }

    Ok(())
}

pub async fn load_cli_settings(cli: &CliArgs) -> Result<LoadedSettings> {
    load_settings(cli.config.as_deref(), &cli.set)
        .await
        .map_err(describe_config_error)
}

fn describe_config_error(err: ConfigError) -> anyhow::Error {
    describe(err.into_inner())
}

pub fn describe_key_error(err: KeyError) -> anyhow::Error {
    describe(err.into_inner())
}

fn describe(obj: authgate_errors::prelude::ErrorObj) -> anyhow::Error {
    anyhow::anyhow!(
        "{} ({})",
        obj.message_dev.as_deref().unwrap_or(&obj.message_user),
        obj.code.0
    )
}
