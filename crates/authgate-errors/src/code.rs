use crate::class::{ErrorKind, RetryClass, Severity};
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Stable dotted identifier such as `TOKEN.EXPIRED`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub &'static str);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        REGISTRY
            .get_key_value(raw.as_str())
            .map(|(key, _)| ErrorCode(key))
            .ok_or_else(|| serde::de::Error::custom(format!("unregistered error code `{raw}`")))
    }
}

#[derive(Clone, Debug)]
pub struct CodeSpec {
    pub code: ErrorCode,
    pub kind: ErrorKind,
    pub http_status: u16,
    pub retryable: RetryClass,
    pub severity: Severity,
    pub default_user_msg: &'static str,
}

pub mod codes {
    use super::ErrorCode;

    pub const AUTH_UNAUTHENTICATED: ErrorCode = ErrorCode("AUTH.UNAUTHENTICATED");
    pub const TOKEN_MISSING: ErrorCode = ErrorCode("TOKEN.MISSING");
    pub const TOKEN_MALFORMED: ErrorCode = ErrorCode("TOKEN.MALFORMED");
    pub const TOKEN_UNSUPPORTED_ALG: ErrorCode = ErrorCode("TOKEN.UNSUPPORTED_ALG");
    pub const TOKEN_SIGNATURE_INVALID: ErrorCode = ErrorCode("TOKEN.SIGNATURE_INVALID");
    pub const TOKEN_EXPIRED: ErrorCode = ErrorCode("TOKEN.EXPIRED");
    pub const TOKEN_NOT_YET_VALID: ErrorCode = ErrorCode("TOKEN.NOT_YET_VALID");
    pub const TOKEN_CLAIM_REJECTED: ErrorCode = ErrorCode("TOKEN.CLAIM_REJECTED");
    pub const KEYS_UNAVAILABLE: ErrorCode = ErrorCode("KEYS.UNAVAILABLE");
    pub const KEYS_TIMEOUT: ErrorCode = ErrorCode("KEYS.TIMEOUT");
    pub const KEYS_NOT_FOUND: ErrorCode = ErrorCode("KEYS.NOT_FOUND");
    pub const KEYS_MALFORMED: ErrorCode = ErrorCode("KEYS.MALFORMED");
    pub const SCHEMA_VALIDATION: ErrorCode = ErrorCode("SCHEMA.VALIDATION_FAILED");
    pub const PROVIDER_UNAVAILABLE: ErrorCode = ErrorCode("PROVIDER.UNAVAILABLE");
    pub const UNKNOWN_INTERNAL: ErrorCode = ErrorCode("UNKNOWN.INTERNAL");
}

use self::codes::*;

const UNAUTHORIZED: &str = "Unauthorized";

/// Every rejected token surfaces to callers as a plain 401.
const fn token(code: ErrorCode, severity: Severity) -> CodeSpec {
    CodeSpec {
        code,
        kind: ErrorKind::Token,
        http_status: 401,
        retryable: RetryClass::Permanent,
        severity,
        default_user_msg: UNAUTHORIZED,
    }
}

const fn keys(code: ErrorCode, http_status: u16, retryable: RetryClass, msg: &'static str) -> CodeSpec {
    CodeSpec {
        code,
        kind: ErrorKind::Keys,
        http_status,
        retryable,
        severity: Severity::Error,
        default_user_msg: msg,
    }
}

const FALLBACK: CodeSpec = CodeSpec {
    code: UNKNOWN_INTERNAL,
    kind: ErrorKind::Unknown,
    http_status: 500,
    retryable: RetryClass::Transient,
    severity: Severity::Critical,
    default_user_msg: "Internal error. Please retry later.",
};

static SPECS: [CodeSpec; 15] = [
    CodeSpec {
        code: AUTH_UNAUTHENTICATED,
        kind: ErrorKind::Auth,
        http_status: 401,
        retryable: RetryClass::Permanent,
        severity: Severity::Warn,
        default_user_msg: UNAUTHORIZED,
    },
    token(TOKEN_MISSING, Severity::Info),
    token(TOKEN_MALFORMED, Severity::Warn),
    token(TOKEN_UNSUPPORTED_ALG, Severity::Warn),
    token(TOKEN_SIGNATURE_INVALID, Severity::Warn),
    token(TOKEN_EXPIRED, Severity::Info),
    token(TOKEN_NOT_YET_VALID, Severity::Info),
    token(TOKEN_CLAIM_REJECTED, Severity::Warn),
    keys(
        KEYS_UNAVAILABLE,
        503,
        RetryClass::Transient,
        "Key distribution endpoint is unavailable.",
    ),
    keys(
        KEYS_TIMEOUT,
        504,
        RetryClass::Transient,
        "Key distribution endpoint did not respond in time.",
    ),
    CodeSpec {
        code: KEYS_NOT_FOUND,
        kind: ErrorKind::Keys,
        http_status: 401,
        retryable: RetryClass::Permanent,
        severity: Severity::Warn,
        default_user_msg: UNAUTHORIZED,
    },
    keys(
        KEYS_MALFORMED,
        502,
        RetryClass::Permanent,
        "Published key material is invalid.",
    ),
    CodeSpec {
        code: SCHEMA_VALIDATION,
        kind: ErrorKind::Schema,
        http_status: 422,
        retryable: RetryClass::Permanent,
        severity: Severity::Warn,
        default_user_msg: "Configuration is invalid.",
    },
    CodeSpec {
        code: PROVIDER_UNAVAILABLE,
        kind: ErrorKind::Provider,
        http_status: 503,
        retryable: RetryClass::Transient,
        severity: Severity::Error,
        default_user_msg: "Configuration provider is unavailable.",
    },
    FALLBACK,
];

pub static REGISTRY: Lazy<HashMap<&'static str, &'static CodeSpec>> =
    Lazy::new(|| SPECS.iter().map(|spec| (spec.code.0, spec)).collect());

/// Looks up the registered spec; codes built outside [`codes`] resolve to `UNKNOWN.INTERNAL`.
pub fn spec_of(code: ErrorCode) -> &'static CodeSpec {
    REGISTRY.get(code.0).copied().unwrap_or(&FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        assert_eq!(REGISTRY.len(), SPECS.len());
    }

    #[test]
    fn unregistered_code_falls_back() {
        let spec = spec_of(ErrorCode("NOPE.MISSING"));
        assert_eq!(spec.code, codes::UNKNOWN_INTERNAL);
        assert_eq!(spec.http_status, 500);
    }
}
