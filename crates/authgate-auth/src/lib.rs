pub mod decision;
pub mod errors;
pub mod events;
pub mod model;
pub mod prelude;
pub mod verify;

use prelude::*;
use std::sync::Arc;
use std::time::Instant;

pub struct Authorizer {
    pub verifier: Box<dyn Verifier>,
    pub sink: Arc<dyn DecisionSink>,
}

impl Authorizer {
    pub fn new(verifier: Box<dyn Verifier>) -> Self {
        Self {
            verifier,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DecisionSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Allow with a decision, or the bare `Unauthorized` signal. Internal error detail
    /// only reaches the sink.
    pub async fn authorize(
        &self,
        raw_token: Option<&str>,
        resource: &str,
        correlation_id: Option<&str>,
    ) -> Result<Decision, Unauthorized> {
        let start = Instant::now();
        tracing::debug!(
            correlation_id = correlation_id.unwrap_or("-"),
            resource,
            has_token = raw_token.is_some(),
            "authorization request received"
        );

        let token = raw_token.map(strip_bearer).unwrap_or_default();
        let outcome = if token.is_empty() {
            Err(errors::missing_token())
        } else {
            self.verifier.verify(token).await
        };

        let mut event = AuthDecisionEvent {
            correlation_id: correlation_id.map(str::to_string),
            resource: resource.to_string(),
            allow: false,
            principal_id: None,
            code: None,
            reason: None,
            elapsed_ms: 0,
        };

        let result = match outcome {
            Ok(claims) => {
                let decision = DecisionBuilder::allow(&claims, resource);
                event.allow = true;
                event.principal_id = Some(decision.principal_id.clone());
                Ok(decision)
            }
            Err(err) => {
                let obj = err.into_inner();
                tracing::debug!(audit = ?obj.to_audit(), "token rejected");
                event.code = Some(obj.code.0.to_string());
                event.reason = obj.message_dev;
                Err(DecisionBuilder::deny())
            }
        };

        event.elapsed_ms = start.elapsed().as_millis() as u64;
        self.sink.record(&event);
        result
    }
}

/// Removes one leading case-insensitive `Bearer` scheme followed by whitespace.
pub fn strip_bearer(raw: &str) -> &str {
    let raw = raw.trim_start();
    match raw.get(..6) {
        Some(scheme)
            if scheme.eq_ignore_ascii_case("bearer")
                && raw[6..].starts_with(char::is_whitespace) =>
        {
            raw[6..].trim()
        }
        _ => raw.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_once_in_any_case() {
        assert_eq!(strip_bearer("Bearer abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer("bearer   abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer("BEARER\tabc"), "abc");
        assert_eq!(strip_bearer("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(strip_bearer("Bearer Bearer abc"), "Bearer abc");
        assert_eq!(strip_bearer("Bearerabc"), "Bearerabc");
        assert_eq!(strip_bearer("Bearer "), "");
        assert_eq!(strip_bearer("  Bearer x "), "x");
    }
}
