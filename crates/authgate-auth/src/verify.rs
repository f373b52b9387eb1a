use crate::errors::{self, AuthError};
use crate::model::ClaimSet;
use authgate_keys::prelude::{KeyAlgorithm, KeyStore, VerificationKey};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{decode, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;

#[async_trait::async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<ClaimSet, AuthError>;
}

#[derive(Clone, Debug)]
pub struct VerifyPolicy {
    pub leeway_secs: u64,
    pub issuer: Option<String>,
    pub audience: Option<Vec<String>>,
    /// Header `typ` values whose tokens may omit `exp`.
    pub no_expiry_types: Vec<String>,
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self {
            leeway_secs: 30,
            issuer: None,
            audience: None,
            no_expiry_types: Vec::new(),
        }
    }
}

/// Unverified header, read before any key lookup.
#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
    #[serde(default)]
    typ: Option<String>,
}

fn read_header(token: &str) -> Result<RawHeader, AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments[0].is_empty() {
        return Err(errors::malformed("token is not three dot-separated segments"));
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|e| errors::malformed(&format!("header encoding: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| errors::malformed(&format!("header json: {e}")))
}

fn accepted(alg: &str) -> Option<(Algorithm, KeyAlgorithm)> {
    match alg {
        "ES256" => Some((Algorithm::ES256, KeyAlgorithm::EcP256)),
        "HS256" => Some((Algorithm::HS256, KeyAlgorithm::Hmac)),
        _ => None,
    }
}

pub struct TokenVerifier {
    keys: Arc<KeyStore>,
    policy: VerifyPolicy,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyStore>, policy: VerifyPolicy) -> Self {
        Self { keys, policy }
    }

    pub fn keys(&self) -> &Arc<KeyStore> {
        &self.keys
    }

    pub fn policy(&self) -> &VerifyPolicy {
        &self.policy
    }

    async fn resolve_key(&self, kid: Option<&str>) -> Result<Arc<VerificationKey>, AuthError> {
        let key = match kid {
            Some(kid) if !kid.is_empty() => self.keys.get_key(kid).await?,
            _ => self.keys.get_sole_key().await?,
        };
        Ok(key)
    }

    fn validation(&self, alg: Algorithm, typ: Option<&str>) -> Validation {
        let mut validation = Validation::new(alg);
        validation.leeway = self.policy.leeway_secs;
        validation.validate_nbf = true;

        let no_expiry = typ.is_some_and(|typ| {
            self.policy
                .no_expiry_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(typ))
        });
        if no_expiry {
            validation.required_spec_claims.clear();
        }

        if let Some(issuer) = &self.policy.issuer {
            validation.set_issuer(&[issuer.as_str()]);
            validation.required_spec_claims.insert("iss".to_string());
        }
        match &self.policy.audience {
            Some(audience) => {
                validation.set_audience(audience.as_slice());
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }
        validation
    }

    /// Checks `iat`, and `exp` again for values the decoder cannot read as unsigned.
    fn check_timestamps(&self, claims: &ClaimSet) -> Result<(), AuthError> {
        let now = chrono::Utc::now().timestamp();
        let leeway = self.policy.leeway_secs as i64;
        if let Some(exp) = claims.exp {
            if exp < now.saturating_sub(leeway) {
                return Err(errors::expired("exp is in the past"));
            }
        }
        if let Some(iat) = claims.iat {
            if iat > now.saturating_add(leeway) {
                return Err(errors::not_yet_valid("iat is in the future"));
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Verifier for TokenVerifier {
    async fn verify(&self, token: &str) -> Result<ClaimSet, AuthError> {
        if token.is_empty() {
            return Err(errors::missing_token());
        }

        let header = read_header(token)?;
        let Some((alg, family)) = accepted(&header.alg) else {
            return Err(errors::unsupported_alg(&header.alg));
        };

        let key = self.resolve_key(header.kid.as_deref()).await?;
        if key.algorithm != family {
            tracing::warn!(
                kid = %key.kid,
                alg = %header.alg,
                key_family = key.algorithm.as_str(),
                "token algorithm does not match key family"
            );
            return Err(errors::unsupported_alg(&header.alg));
        }

        let validation = self.validation(alg, header.typ.as_deref());
        let data = decode::<ClaimSet>(token, &key.decoding, &validation)?;
        self.check_timestamps(&data.claims)?;

        tracing::debug!(kid = %key.kid, alg = %header.alg, "token verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgate_errors::prelude::codes;

    #[test]
    fn header_needs_three_segments() {
        let err = read_header("abc.def").unwrap_err();
        assert_eq!(err.code(), codes::TOKEN_MALFORMED);
        let err = read_header(".def.ghi").unwrap_err();
        assert_eq!(err.code(), codes::TOKEN_MALFORMED);
    }

    #[test]
    fn header_reads_any_alg_string() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let parsed = read_header(&format!("{header}.e30.")).unwrap();
        assert_eq!(parsed.alg, "none");
        assert!(parsed.kid.is_none());
        assert!(accepted(&parsed.alg).is_none());
    }

    #[test]
    fn only_es256_and_hs256_are_accepted() {
        assert_eq!(accepted("ES256").map(|a| a.1), Some(KeyAlgorithm::EcP256));
        assert_eq!(accepted("HS256").map(|a| a.1), Some(KeyAlgorithm::Hmac));
        for alg in ["RS256", "ES384", "HS512", "EdDSA", "none", "es256"] {
            assert!(accepted(alg).is_none(), "{alg} should be rejected");
        }
    }
}
