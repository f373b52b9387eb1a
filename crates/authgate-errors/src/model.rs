use crate::class::{ErrorKind, RetryClass, Severity};
use crate::code::{spec_of, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A classified failure. `message_user` is safe to return to callers;
/// everything else is for logs and audit only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorObj {
    pub code: ErrorCode,
    pub kind: ErrorKind,
    pub message_user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_dev: Option<String>,
    pub http_status: u16,
    pub retryable: RetryClass,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl ErrorObj {
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }

    pub fn is_transient(&self) -> bool {
        self.retryable == RetryClass::Transient
    }
}

impl fmt::Display for ErrorObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message_dev {
            Some(dev) => write!(f, "{}: {dev}", self.code),
            None => write!(f, "{}: {}", self.code, self.message_user),
        }
    }
}

impl std::error::Error for ErrorObj {}

#[must_use]
pub struct ErrorBuilder {
    code: ErrorCode,
    user: Option<String>,
    dev: Option<String>,
    meta: Map<String, Value>,
    correlation_id: Option<String>,
}

impl ErrorBuilder {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            user: None,
            dev: None,
            meta: Map::new(),
            correlation_id: None,
        }
    }

    pub fn user_msg(self, message: impl Into<String>) -> Self {
        Self {
            user: Some(message.into()),
            ..self
        }
    }

    pub fn dev_msg(self, message: impl Into<String>) -> Self {
        Self {
            dev: Some(message.into()),
            ..self
        }
    }

    pub fn meta_kv(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    pub fn correlation(self, id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(id.into()),
            ..self
        }
    }

    /// Fills classification from the code registry.
    pub fn build(self) -> ErrorObj {
        let spec = spec_of(self.code);
        ErrorObj {
            code: spec.code,
            kind: spec.kind,
            message_user: self.user.unwrap_or_else(|| spec.default_user_msg.to_owned()),
            message_dev: self.dev,
            http_status: spec.http_status,
            retryable: spec.retryable,
            severity: spec.severity,
            meta: self.meta,
            correlation_id: self.correlation_id,
        }
    }
}
