use super::{Source, SourceSnapshot};
use crate::errors::ConfigError;
use crate::model::{Layer, ProvenanceEntry};
use async_trait::async_trait;
use crate::access;

/// Maps `PREFIX__KEYS__CACHE_TTL_SECS=60` to `keys.cache_ttl_secs = 60`.
pub struct EnvSource {
    pub prefix: String,
    pub separator: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: "__".into(),
        }
    }

    pub(crate) fn collect<I>(&self, vars: I) -> SourceSnapshot
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = serde_json::Map::new();
        let mut provenance = Vec::new();
        let lead = format!("{}{}", self.prefix, self.separator);

        for (key, value) in vars {
            let Some(trimmed) = key.strip_prefix(&lead) else {
                continue;
            };
            if trimmed.is_empty() {
                continue;
            }
            let normalized = trimmed
                .split(&self.separator)
                .filter(|seg| !seg.is_empty())
                .map(|seg| seg.to_ascii_lowercase())
                .collect::<Vec<_>>()
                .join(".");

            access::set_path(&mut map, &normalized, access::parse_scalar(&value));
            provenance.push(ProvenanceEntry::now(normalized.as_str(), self.id(), Layer::Env));
        }

        SourceSnapshot { map, provenance }
    }
}

#[async_trait]
impl Source for EnvSource {
    fn id(&self) -> &'static str {
        "env"
    }

    async fn load(&self) -> Result<SourceSnapshot, ConfigError> {
        Ok(self.collect(std::env::vars()))
    }
}
