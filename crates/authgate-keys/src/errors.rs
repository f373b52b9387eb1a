use authgate_errors::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct KeyError(pub Box<ErrorObj>);

impl KeyError {
    pub fn into_inner(self) -> ErrorObj {
        *self.0
    }

    pub fn code(&self) -> ErrorCode {
        self.0.code
    }

    pub fn unavailable(msg: &str) -> Self {
        Self::from_builder(
            ErrorBuilder::new(codes::KEYS_UNAVAILABLE)
                .user_msg("Unauthorized")
                .dev_msg(msg),
        )
    }

    pub fn timeout(phase: &str) -> Self {
        Self::from_builder(
            ErrorBuilder::new(codes::KEYS_TIMEOUT)
                .user_msg("Unauthorized")
                .dev_msg(format!("{phase} timed out")),
        )
    }

    pub fn not_found(kid: &str, msg: &str) -> Self {
        Self::from_builder(
            ErrorBuilder::new(codes::KEYS_NOT_FOUND)
                .dev_msg(msg)
                .meta_kv("kid", serde_json::Value::String(kid.to_string())),
        )
    }

    pub fn malformed(kid: Option<&str>, msg: &str) -> Self {
        let mut builder = ErrorBuilder::new(codes::KEYS_MALFORMED)
            .user_msg("Unauthorized")
            .dev_msg(msg);
        if let Some(kid) = kid {
            builder = builder.meta_kv("kid", serde_json::Value::String(kid.to_string()));
        }
        Self::from_builder(builder)
    }

    fn from_builder(builder: ErrorBuilder) -> Self {
        KeyError(Box::new(builder.build()))
    }
}

impl From<ErrorObj> for KeyError {
    fn from(value: ErrorObj) -> Self {
        KeyError(Box::new(value))
    }
}
