use super::authorize::cmd_authorize;
use super::env::CliArgs;
use super::keys::cmd_keys;
use super::serve::cmd_serve;
use crate::cli::commands::Commands;
use crate::config::AuthgateSettings;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, settings: &AuthgateSettings) -> Result<()> {
    match cli.command.clone() {
        Commands::Authorize(args) => cmd_authorize(args, settings).await,
        Commands::Serve(args) => cmd_serve(args, settings).await,
        Commands::Keys(args) => cmd_keys(args, settings).await,
    }
}
