use authgate_errors::prelude::*;
use thiserror::Error;

/// Loading or validation failure, carrying a `SCHEMA.*` or `PROVIDER.*` code.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ConfigError(pub Box<ErrorObj>);

impl ConfigError {
    pub fn into_inner(self) -> ErrorObj {
        *self.0
    }

    pub fn code(&self) -> ErrorCode {
        self.0.code
    }

    pub fn dev_message(&self) -> Option<&str> {
        self.0.message_dev.as_deref()
    }

    fn with_detail(code: ErrorCode, phase: &str, detail: &str) -> Self {
        ConfigError(Box::new(
            ErrorBuilder::new(code)
                .dev_msg(format!("{phase}: {detail}"))
                .build(),
        ))
    }
}

pub fn schema_invalid(phase: &str, detail: &str) -> ConfigError {
    ConfigError::with_detail(codes::SCHEMA_VALIDATION, phase, detail)
}

pub fn io_provider_unavailable(phase: &str, detail: &str) -> ConfigError {
    ConfigError::with_detail(codes::PROVIDER_UNAVAILABLE, phase, detail)
}
