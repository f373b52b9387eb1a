pub use crate::{
    decision::DecisionBuilder,
    errors::AuthError,
    events::{AuthDecisionEvent, DecisionSink, MemorySink, TracingSink},
    model::{
        ClaimSet, Decision, Effect, PolicyDocument, Statement, Unauthorized, INVOKE_ACTION,
        POLICY_VERSION,
    },
    strip_bearer,
    verify::{TokenVerifier, Verifier, VerifyPolicy},
    Authorizer,
};
