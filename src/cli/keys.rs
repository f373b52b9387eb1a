use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::runtime::describe_key_error;
use crate::config::AuthgateSettings;
use crate::host::AuthGate;

#[derive(Args, Clone)]
pub struct KeysArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn cmd_keys(args: KeysArgs, settings: &AuthgateSettings) -> Result<()> {
    let gate = AuthGate::from_settings(settings).map_err(describe_key_error)?;
    gate.keys.invalidate();
    let refresh = gate.keys.refresh().await.map_err(describe_key_error)?;

    if args.json {
        let keys: Vec<_> = refresh
            .keys
            .iter()
            .map(|key| json!({"kid": key.kid, "alg": key.algorithm.as_str()}))
            .collect();
        let rejected: Vec<_> = refresh
            .rejected
            .iter()
            .map(|r| json!({"kid": r.kid, "reason": r.reason}))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({"keys": keys, "rejected": rejected}))?
        );
        return Ok(());
    }

    println!("{:<40} ALG", "KID");
    for key in &refresh.keys {
        println!("{:<40} {}", key.kid, key.algorithm.as_str());
    }
    for rejected in &refresh.rejected {
        println!("{:<40} rejected: {}", rejected.kid, rejected.reason);
    }
    if refresh.keys.is_empty() {
        println!("(no usable keys published)");
    }
    Ok(())
}
