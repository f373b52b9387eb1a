use crate::access;
use crate::errors::{schema_invalid, ConfigError};
use crate::model::{Checksum, KeyPath, ProvenanceEntry, SnapshotVersion};
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Immutable, validated settings tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    version: SnapshotVersion,
    checksum: Checksum,
    issued_at_ms: i64,
    tree: Value,
    provenance: Vec<ProvenanceEntry>,
}

impl ConfigSnapshot {
    pub fn from_tree(
        tree: Value,
        version: SnapshotVersion,
        provenance: Vec<ProvenanceEntry>,
    ) -> Result<Self, ConfigError> {
        let canonical =
            serde_json::to_vec(&tree).map_err(|e| schema_invalid("checksum", &e.to_string()))?;
        let digest = Sha256::digest(&canonical);

        Ok(Self {
            version,
            checksum: Checksum(STANDARD_NO_PAD.encode(digest)),
            issued_at_ms: chrono::Utc::now().timestamp_millis(),
            tree,
            provenance,
        })
    }

    pub fn version(&self) -> &SnapshotVersion {
        &self.version
    }

    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    pub fn issued_at_ms(&self) -> i64 {
        self.issued_at_ms
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    pub fn provenance(&self) -> &[ProvenanceEntry] {
        &self.provenance
    }

    /// Typed read of a single key.
    pub fn get<T: DeserializeOwned>(&self, path: &KeyPath) -> Result<T, ConfigError> {
        let Some(value) = access::get_path(&self.tree, &path.0) else {
            return Err(schema_invalid("missing", &path.0));
        };
        T::deserialize(value).map_err(|e| schema_invalid("type", &format!("{path}: {e}")))
    }

    /// Deserializes the whole tree into a typed settings struct.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        T::deserialize(&self.tree).map_err(|e| schema_invalid("decode", &e.to_string()))
    }
}
