use std::collections::BTreeMap;
use std::sync::Arc;

use authgate_auth::prelude::*;
use authgate_keys::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AuthgateSettings;

/// Inbound token-authorizer invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAuthorizerEvent {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_token: Option<String>,
    #[serde(default)]
    pub method_arn: String,
}

/// Allow payload handed back to the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_document: Option<PolicyDocument>,
    pub context: BTreeMap<String, String>,
}

impl From<Decision> for AuthorizerResponse {
    fn from(decision: Decision) -> Self {
        Self {
            policy_document: decision.policy_document(),
            principal_id: decision.principal_id,
            context: decision.context,
        }
    }
}

/// The authorizer plus the key store it reads from, built once per process.
pub struct AuthGate {
    pub authorizer: Authorizer,
    pub keys: Arc<KeyStore>,
}

impl AuthGate {
    pub fn new(keys: Arc<KeyStore>, policy: VerifyPolicy) -> Self {
        let authorizer = Authorizer::new(Box::new(TokenVerifier::new(keys.clone(), policy)));
        Self { authorizer, keys }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DecisionSink>) -> Self {
        self.authorizer = self.authorizer.with_sink(sink);
        self
    }

    pub fn from_settings(settings: &AuthgateSettings) -> Result<Self, KeyError> {
        let url = settings
            .keys
            .jwks_url
            .as_deref()
            .ok_or_else(|| KeyError::unavailable("keys.jwks_url is not configured"))?;
        let source = HttpKeySetSource::new(url, settings.fetch_timeout())?;
        let keys = Arc::new(KeyStore::new(Arc::new(source), settings.key_store_config()));
        info!(
            jwks_url = url,
            ttl_secs = settings.keys.cache_ttl_secs,
            allow_symmetric = settings.keys.allow_symmetric,
            "authorizer configured"
        );
        Ok(Self::new(keys, settings.verify_policy()))
    }

    pub async fn handle_event(
        &self,
        event: &TokenAuthorizerEvent,
        correlation_id: Option<&str>,
    ) -> Result<AuthorizerResponse, Unauthorized> {
        handle_event(&self.authorizer, event, correlation_id).await
    }
}

pub async fn handle_event(
    authorizer: &Authorizer,
    event: &TokenAuthorizerEvent,
    correlation_id: Option<&str>,
) -> Result<AuthorizerResponse, Unauthorized> {
    info!(
        correlation_id = correlation_id.unwrap_or("-"),
        kind = event.kind.as_deref().unwrap_or("TOKEN"),
        method_arn = %event.method_arn,
        token = redact(event.authorization_token.as_deref()),
        "authorizer invoked"
    );

    authorizer
        .authorize(
            event.authorization_token.as_deref(),
            &event.method_arn,
            correlation_id,
        )
        .await
        .map(AuthorizerResponse::from)
}

fn redact(token: Option<&str>) -> &'static str {
    match token {
        None => "absent",
        Some(t) if t.trim().is_empty() => "empty",
        Some(_) => "present",
    }
}
