use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio::io::AsyncReadExt;

use super::runtime::describe_key_error;
use crate::config::AuthgateSettings;
use crate::host::{AuthGate, TokenAuthorizerEvent};

#[derive(Args, Clone)]
pub struct AuthorizeArgs {
    /// Event JSON file, or `-` for stdin
    #[arg(long, value_name = "FILE", default_value = "-")]
    pub event: PathBuf,

    /// Correlation id recorded with the decision
    #[arg(long)]
    pub request_id: Option<String>,
}

pub async fn cmd_authorize(args: AuthorizeArgs, settings: &AuthgateSettings) -> Result<()> {
    let raw = read_event(&args.event).await?;
    let event: TokenAuthorizerEvent =
        serde_json::from_str(&raw).context("event is not a token-authorizer payload")?;

    let gate = AuthGate::from_settings(settings).map_err(describe_key_error)?;

    match gate.handle_event(&event, args.request_id.as_deref()).await {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(denied) => bail!(denied),
    }
}

async fn read_event(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .context("failed to read event from stdin")?;
        return Ok(buf);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read event file {}", path.display()))
}
