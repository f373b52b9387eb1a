use crate::model::ErrorObj;
use serde::Serialize;
use serde_json::{Map, Value};

/// What a caller may see.
#[derive(Debug, Serialize)]
pub struct PublicErrorView<'a> {
    pub code: &'static str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<&'a str>,
}

/// Full classification for logs. Never returned to a caller.
#[derive(Debug, Serialize)]
pub struct AuditErrorView<'a> {
    pub code: &'static str,
    pub kind: &'static str,
    pub http_status: u16,
    pub retryable: &'static str,
    pub severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_dev: Option<&'a str>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub meta: &'a Map<String, Value>,
}

impl ErrorObj {
    pub fn to_public(&self) -> PublicErrorView<'_> {
        PublicErrorView {
            code: self.code.0,
            message: &self.message_user,
            correlation_id: self.correlation_id.as_deref(),
        }
    }

    pub fn to_audit(&self) -> AuditErrorView<'_> {
        AuditErrorView {
            code: self.code.0,
            kind: self.kind.as_str(),
            http_status: self.http_status,
            retryable: self.retryable.as_str(),
            severity: self.severity.as_str(),
            message_dev: self.message_dev.as_deref(),
            meta: &self.meta,
        }
    }
}
