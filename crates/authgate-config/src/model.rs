use serde::{Deserialize, Serialize};
use std::fmt;

/// Dotted path into the settings tree, e.g. `keys.cache_ttl_secs`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyPath(pub String);

impl KeyPath {
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|seg| !seg.is_empty())
    }
}

impl From<&str> for KeyPath {
    fn from(raw: &str) -> Self {
        KeyPath(raw.to_owned())
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

/// Precedence layer, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Defaults,
    File,
    Env,
    Cli,
}

/// Records which source last set a key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    pub key: KeyPath,
    pub source_id: String,
    pub layer: Layer,
    pub ts_ms: i64,
}

impl ProvenanceEntry {
    pub fn now(key: impl Into<KeyPath>, source_id: &str, layer: Layer) -> Self {
        Self {
            key: key.into(),
            source_id: source_id.to_owned(),
            layer,
            ts_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotVersion(pub String);

/// Base64 SHA-256 of the canonical JSON tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checksum(pub String);

impl Checksum {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
