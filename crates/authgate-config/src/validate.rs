use crate::errors::{schema_invalid, ConfigError};
use crate::access;

#[async_trait::async_trait]
pub trait Validator: Send + Sync {
    async fn validate_boot(&self, tree: &serde_json::Value) -> Result<(), ConfigError>;
}

/// Only checks that the listed keys are present.
#[derive(Default)]
pub struct BasicValidator {
    pub required: Vec<String>,
}

#[async_trait::async_trait]
impl Validator for BasicValidator {
    async fn validate_boot(&self, tree: &serde_json::Value) -> Result<(), ConfigError> {
        for key in &self.required {
            match access::get_path(tree, key) {
                None | Some(serde_json::Value::Null) => {
                    return Err(schema_invalid("required", key));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
