use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use super::runtime::describe_key_error;
use crate::config::AuthgateSettings;
use crate::host::AuthGate;
use crate::server::{serve, ServeState};

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Listen address; overrides `server.bind`
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Fetch the key set before accepting requests
    #[arg(long)]
    pub warm: bool,
}

pub async fn cmd_serve(args: ServeArgs, settings: &AuthgateSettings) -> Result<()> {
    let bind = match args.bind {
        Some(addr) => addr,
        None => settings
            .server
            .bind
            .parse()
            .with_context(|| format!("invalid server.bind '{}'", settings.server.bind))?,
    };

    let gate = AuthGate::from_settings(settings).map_err(describe_key_error)?;

    if args.warm {
        match gate.keys.refresh().await {
            Ok(refresh) => tracing::info!(keys = refresh.keys.len(), "key cache warmed"),
            Err(err) => tracing::warn!(code = err.code().0, "key cache warm-up failed"),
        }
    }

    serve(ServeState::new(Arc::new(gate)), bind).await
}
