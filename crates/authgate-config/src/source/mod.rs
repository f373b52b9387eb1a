//! Configuration layers. Each source yields a partial tree plus provenance.

use crate::errors::ConfigError;
use crate::model::{ConfigMap, ProvenanceEntry};

pub mod cli;
pub mod env;
pub mod file;

#[derive(Clone, Debug, Default)]
pub struct SourceSnapshot {
    pub map: ConfigMap,
    pub provenance: Vec<ProvenanceEntry>,
}

#[async_trait::async_trait]
pub trait Source: Send + Sync {
    /// Short label recorded in provenance.
    fn id(&self) -> &'static str;

    async fn load(&self) -> Result<SourceSnapshot, ConfigError>;
}
