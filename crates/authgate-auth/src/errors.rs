use authgate_errors::prelude::*;
use authgate_keys::errors::KeyError;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0:?}")]
pub struct AuthError(pub Box<ErrorObj>);

impl AuthError {
    pub fn into_inner(self) -> ErrorObj {
        *self.0
    }

    pub fn code(&self) -> ErrorCode {
        self.0.code
    }
}

fn build(code: ErrorCode, msg: &str) -> AuthError {
    AuthError(Box::new(ErrorBuilder::new(code).dev_msg(msg).build()))
}

pub fn missing_token() -> AuthError {
    build(codes::TOKEN_MISSING, "no bearer token presented")
}

pub fn malformed(msg: &str) -> AuthError {
    build(codes::TOKEN_MALFORMED, msg)
}

pub fn unsupported_alg(alg: &str) -> AuthError {
    AuthError(Box::new(
        ErrorBuilder::new(codes::TOKEN_UNSUPPORTED_ALG)
            .dev_msg(format!("algorithm {alg} is not accepted"))
            .meta_kv("alg", serde_json::Value::String(alg.to_string()))
            .build(),
    ))
}

pub fn signature_invalid() -> AuthError {
    build(codes::TOKEN_SIGNATURE_INVALID, "signature mismatch")
}

pub fn expired(msg: &str) -> AuthError {
    build(codes::TOKEN_EXPIRED, msg)
}

pub fn not_yet_valid(msg: &str) -> AuthError {
    build(codes::TOKEN_NOT_YET_VALID, msg)
}

pub fn claim_rejected(msg: &str) -> AuthError {
    build(codes::TOKEN_CLAIM_REJECTED, msg)
}

pub fn internal(msg: &str) -> AuthError {
    build(codes::UNKNOWN_INTERNAL, msg)
}

impl From<KeyError> for AuthError {
    fn from(value: KeyError) -> Self {
        AuthError(value.0)
    }
}

impl From<ErrorObj> for AuthError {
    fn from(value: ErrorObj) -> Self {
        AuthError(Box::new(value))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => signature_invalid(),
            ErrorKind::ExpiredSignature => expired("exp is in the past"),
            ErrorKind::ImmatureSignature => not_yet_valid("nbf is in the future"),
            ErrorKind::MissingRequiredClaim(claim) if claim == "exp" => {
                expired("token carries no exp")
            }
            ErrorKind::MissingRequiredClaim(claim) => {
                claim_rejected(&format!("missing required claim {claim}"))
            }
            ErrorKind::InvalidIssuer => claim_rejected("issuer rejected"),
            ErrorKind::InvalidAudience => claim_rejected("audience rejected"),
            ErrorKind::InvalidSubject => claim_rejected("subject rejected"),
            ErrorKind::InvalidAlgorithm => unsupported_alg("mismatched"),
            _ => malformed(&err.to_string()),
        }
    }
}
