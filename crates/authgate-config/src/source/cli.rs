use super::{Source, SourceSnapshot};
use crate::errors::ConfigError;
use crate::model::{Layer, ProvenanceEntry};
use async_trait::async_trait;
use crate::access;
use crate::errors::schema_invalid;

/// Accepts `--keys.cache_ttl_secs=60` or bare `keys.cache_ttl_secs=60` pairs.
pub struct CliArgsSource {
    pub args: Vec<String>,
}

#[async_trait]
impl Source for CliArgsSource {
    fn id(&self) -> &'static str {
        "cli"
    }

    async fn load(&self) -> Result<SourceSnapshot, ConfigError> {
        let mut map = serde_json::Map::new();
        let mut provenance = Vec::new();

        for arg in &self.args {
            let pair = arg.strip_prefix("--").unwrap_or(arg);
            let Some((key, value)) = pair.split_once('=') else {
                return Err(schema_invalid(
                    "cli override",
                    &format!("expected key=value, got '{arg}'"),
                ));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(schema_invalid("cli override", "empty key"));
            }

            access::set_path(&mut map, key, access::parse_scalar(value));
            provenance.push(ProvenanceEntry::now(key, self.id(), Layer::Cli));
        }

        Ok(SourceSnapshot { map, provenance })
    }
}
