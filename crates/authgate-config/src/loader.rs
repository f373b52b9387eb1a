use crate::access;
use crate::errors::{schema_invalid, ConfigError};
use crate::model::{ConfigMap, Layer, ProvenanceEntry, SnapshotVersion};
use crate::snapshot::ConfigSnapshot;
use crate::source::Source;
use crate::validate::{BasicValidator, Validator};
use serde_json::Value;
use std::sync::Arc;

/// Layers defaults, then each source in order, then validates the merged tree.
pub struct Loader {
    pub defaults: ConfigMap,
    pub sources: Vec<Arc<dyn Source>>,
    pub validator: Arc<dyn Validator>,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            defaults: ConfigMap::new(),
            sources: Vec::new(),
            validator: Arc::new(BasicValidator::default()),
        }
    }
}

impl Loader {
    /// Non-object values are ignored.
    pub fn with_defaults(self, defaults: Value) -> Self {
        match defaults {
            Value::Object(defaults) => Self { defaults, ..self },
            _ => self,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn Source>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_validator(self, validator: Arc<dyn Validator>) -> Self {
        Self { validator, ..self }
    }

    pub async fn load_once(&self) -> Result<ConfigSnapshot, ConfigError> {
        let (tree, provenance) = self.merge_sources().await?;
        self.seal(tree, "v1", provenance).await
    }

    /// Loads as usual, then merges `overrides` on top as a final CLI layer.
    pub async fn load_with(&self, overrides: Value) -> Result<ConfigSnapshot, ConfigError> {
        let Value::Object(overrides) = overrides else {
            return Err(schema_invalid("overrides", "expected a JSON object"));
        };

        let base = self.load_once().await?;
        let mut provenance = base.provenance().to_vec();
        let mut tree = match base.tree() {
            Value::Object(map) => map.clone(),
            _ => ConfigMap::new(),
        };
        access::merge_object(&mut tree, overrides);
        provenance.push(ProvenanceEntry::now("**", "overrides", Layer::Cli));

        self.seal(tree, "v1-overrides", provenance).await
    }

    async fn merge_sources(&self) -> Result<(ConfigMap, Vec<ProvenanceEntry>), ConfigError> {
        let mut tree = self.defaults.clone();
        let mut provenance = Vec::new();
        if !tree.is_empty() {
            provenance.push(ProvenanceEntry::now("**", "defaults", Layer::Defaults));
        }

        for source in &self.sources {
            let layer = source.load().await?;
            access::merge_object(&mut tree, layer.map);
            provenance.extend(layer.provenance);
        }
        Ok((tree, provenance))
    }

    async fn seal(
        &self,
        tree: ConfigMap,
        version: &str,
        provenance: Vec<ProvenanceEntry>,
    ) -> Result<ConfigSnapshot, ConfigError> {
        let tree = Value::Object(tree);
        self.validator.validate_boot(&tree).await?;
        ConfigSnapshot::from_tree(tree, SnapshotVersion(version.to_owned()), provenance)
    }
}
