use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One record per authorization call. Never carries the raw token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDecisionEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub resource: String,
    pub allow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    /// Error code behind a deny, e.g. `TOKEN.EXPIRED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub elapsed_ms: u64,
}

pub trait DecisionSink: Send + Sync {
    fn record(&self, event: &AuthDecisionEvent);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DecisionSink for TracingSink {
    fn record(&self, event: &AuthDecisionEvent) {
        let correlation_id = event.correlation_id.as_deref().unwrap_or("-");
        if event.allow {
            tracing::info!(
                target: "authgate::decision",
                correlation_id,
                resource = %event.resource,
                principal_id = event.principal_id.as_deref().unwrap_or(""),
                elapsed_ms = event.elapsed_ms,
                "request allowed"
            );
        } else {
            tracing::warn!(
                target: "authgate::decision",
                correlation_id,
                resource = %event.resource,
                code = event.code.as_deref().unwrap_or(""),
                reason = event.reason.as_deref().unwrap_or(""),
                elapsed_ms = event.elapsed_ms,
                "request denied"
            );
        }
    }
}

/// Keeps every event in memory; handy for embedding hosts and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AuthDecisionEvent>>,
}

impl MemorySink {
    pub fn events(&self) -> Vec<AuthDecisionEvent> {
        self.events.lock().clone()
    }
}

impl DecisionSink for MemorySink {
    fn record(&self, event: &AuthDecisionEvent) {
        self.events.lock().push(event.clone());
    }
}
