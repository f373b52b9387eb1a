use crate::model::{ClaimSet, Decision, Effect, Unauthorized};
use std::collections::BTreeMap;

pub struct DecisionBuilder;

impl DecisionBuilder {
    pub fn allow(claims: &ClaimSet, resource: &str) -> Decision {
        let subject = claims.subject();
        let email = claims.email();
        let role = claims.role();

        let principal_id = subject
            .iter()
            .chain(email.iter())
            .find(|value| !value.is_empty())
            .cloned()
            .unwrap_or_else(|| "user".to_string());

        let mut context = BTreeMap::new();
        context.insert("userId".to_string(), subject.unwrap_or_default());
        context.insert("email".to_string(), email.unwrap_or_default());
        context.insert("role".to_string(), role.unwrap_or_default());

        Decision {
            principal_id,
            effect: Effect::Allow,
            resource: resource.to_string(),
            context,
        }
    }

    pub fn deny() -> Unauthorized {
        Unauthorized
    }
}
