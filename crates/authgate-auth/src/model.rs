use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Decoded token payload. Identity claims accept any JSON scalar.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Value>,
    #[serde(default, deserialize_with = "numeric_date", skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, deserialize_with = "numeric_date", skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, deserialize_with = "numeric_date", skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn numeric_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.floor() as i64))
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("numeric date out of range")),
        Some(other) => Err(serde::de::Error::custom(format!(
            "numeric date expected, got {other}"
        ))),
    }
}

fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl ClaimSet {
    pub fn subject(&self) -> Option<String> {
        scalar(self.sub.as_ref())
    }

    pub fn email(&self) -> Option<String> {
        scalar(self.email.as_ref())
    }

    pub fn role(&self) -> Option<String> {
        scalar(self.role.as_ref())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Effect")]
    pub effect: Effect,
    #[serde(rename = "Resource")]
    pub resource: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub principal_id: String,
    pub effect: Effect,
    pub resource: String,
    pub context: BTreeMap<String, String>,
}

impl Decision {
    /// Present only for an allow with a known resource.
    pub fn policy_document(&self) -> Option<PolicyDocument> {
        if self.effect != Effect::Allow || self.resource.is_empty() {
            return None;
        }
        Some(PolicyDocument {
            version: POLICY_VERSION.to_string(),
            statements: vec![Statement {
                action: INVOKE_ACTION.to_string(),
                effect: self.effect,
                resource: self.resource.clone(),
            }],
        })
    }
}

/// The only thing a caller learns about a denied request.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("Unauthorized")]
pub struct Unauthorized;
