use super::{Source, SourceSnapshot};
use crate::errors::ConfigError;
use crate::model::{Layer, ProvenanceEntry};
use async_trait::async_trait;
use crate::access;
use crate::errors::{io_provider_unavailable, schema_invalid};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Reads JSON, YAML or TOML files in order; later files win.
pub struct FileSource {
    pub paths: Vec<PathBuf>,
    /// When false a missing file is skipped instead of failing the load.
    pub required: bool,
}

impl FileSource {
    pub fn required(path: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![path.into()],
            required: true,
        }
    }
}

#[async_trait]
impl Source for FileSource {
    fn id(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> Result<SourceSnapshot, ConfigError> {
        let mut merged = Map::new();
        let mut provenance = Vec::new();

        for path in &self.paths {
            if !self.required && !path.exists() {
                continue;
            }
            let content = std::fs::read_to_string(path).map_err(|e| {
                io_provider_unavailable("read file", &format!("{}: {e}", path.display()))
            })?;
            let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
            let value = parse(ext, &content)?;

            match value {
                Value::Object(obj) => {
                    access::merge_object(&mut merged, obj);
                    let source_id = format!("file:{}", path.display());
                    provenance.push(ProvenanceEntry::now("**", &source_id, Layer::File));
                }
                Value::Null => {}
                other => {
                    return Err(schema_invalid(
                        "file root",
                        &format!("{}: expected a table, got {other}", path.display()),
                    ))
                }
            }
        }

        Ok(SourceSnapshot {
            map: merged,
            provenance,
        })
    }
}

fn parse(ext: &str, content: &str) -> Result<Value, ConfigError> {
    match ext {
        "json" => serde_json::from_str::<Value>(content)
            .map_err(|e| schema_invalid("json parse", &e.to_string())),
        #[cfg(feature = "yaml")]
        "yml" | "yaml" => serde_yaml::from_str::<Value>(content)
            .map_err(|e| schema_invalid("yaml parse", &e.to_string())),
        #[cfg(feature = "toml")]
        "toml" => {
            let parsed: toml::Value =
                toml::from_str(content).map_err(|e| schema_invalid("toml parse", &e.to_string()))?;
            serde_json::to_value(parsed).map_err(|e| schema_invalid("toml convert", &e.to_string()))
        }
        other => Err(schema_invalid(
            "file format",
            &format!("unsupported extension '{other}'"),
        )),
    }
}
