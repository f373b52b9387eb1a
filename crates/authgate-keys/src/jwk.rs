use crate::errors::KeyError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Published key-set document: `{"keys": [...]}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JwkSet {
    #[serde(default)]
    pub keys: Vec<Jwk>,
}

/// One published key. Only the members needed for EC P-256 and `oct` keys are modelled;
/// everything else is ignored on read.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    /// ECDSA over P-256 with SHA-256 (`ES256`).
    EcP256,
    /// Shared-secret HMAC-SHA256 (`HS256`).
    Hmac,
}

impl KeyAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyAlgorithm::EcP256 => "ES256",
            KeyAlgorithm::Hmac => "HS256",
        }
    }
}

#[derive(Clone)]
pub struct VerificationKey {
    pub kid: String,
    pub algorithm: KeyAlgorithm,
    pub decoding: DecodingKey,
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedKey {
    pub kid: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ParsedKeys {
    pub keys: Vec<VerificationKey>,
    /// Keys that claimed a supported type but carried unusable material.
    pub rejected: Vec<RejectedKey>,
}

impl JwkSet {
    pub fn into_keys(self, allow_symmetric: bool) -> ParsedKeys {
        let mut parsed = ParsedKeys::default();
        for jwk in self.keys {
            let Some(kid) = jwk.kid.clone().filter(|kid| !kid.is_empty()) else {
                tracing::debug!(kty = %jwk.kty, "skipping published key without kid");
                continue;
            };
            match jwk.to_verification_key(&kid, allow_symmetric) {
                Ok(Some(key)) => parsed.keys.push(key),
                Ok(None) => {}
                Err(err) => {
                    let reason = err
                        .0
                        .message_dev
                        .clone()
                        .unwrap_or_else(|| "malformed key".to_string());
                    tracing::warn!(kid = %kid, reason = %reason, "rejecting published key");
                    parsed.rejected.push(RejectedKey { kid, reason });
                }
            }
        }
        parsed
    }
}

impl Jwk {
    /// `Ok(None)` means the key is of a type this service never verifies with.
    pub fn to_verification_key(
        &self,
        kid: &str,
        allow_symmetric: bool,
    ) -> Result<Option<VerificationKey>, KeyError> {
        if matches!(self.use_.as_deref(), Some(u) if u != "sig") {
            tracing::debug!(kid, "skipping non-signing key");
            return Ok(None);
        }

        match self.kty.as_str() {
            "EC" => self.ec_key(kid).map(Some),
            "oct" if allow_symmetric => {
                tracing::warn!(kid, "admitting symmetric key from published key set");
                self.hmac_key(kid).map(Some)
            }
            "oct" => {
                tracing::warn!(kid, "symmetric key in published key set ignored");
                Ok(None)
            }
            other => {
                tracing::debug!(kid, kty = other, "skipping unsupported key type");
                Ok(None)
            }
        }
    }

    fn ec_key(&self, kid: &str) -> Result<VerificationKey, KeyError> {
        if let Some(alg) = self.alg.as_deref() {
            if alg != "ES256" {
                return Err(KeyError::malformed(
                    Some(kid),
                    &format!("EC key declares alg {alg}"),
                ));
            }
        }
        if self.crv.as_deref() != Some("P-256") {
            return Err(KeyError::malformed(Some(kid), "EC key is not on P-256"));
        }
        let x = self.coordinate(kid, "x", self.x.as_deref())?;
        let y = self.coordinate(kid, "y", self.y.as_deref())?;
        let decoding = DecodingKey::from_ec_components(x, y)
            .map_err(|e| KeyError::malformed(Some(kid), &e.to_string()))?;
        Ok(VerificationKey {
            kid: kid.to_string(),
            algorithm: KeyAlgorithm::EcP256,
            decoding,
        })
    }

    fn coordinate<'a>(
        &self,
        kid: &str,
        name: &str,
        value: Option<&'a str>,
    ) -> Result<&'a str, KeyError> {
        let value =
            value.ok_or_else(|| KeyError::malformed(Some(kid), &format!("EC key lacks {name}")))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(value)
            .map_err(|e| KeyError::malformed(Some(kid), &format!("EC {name}: {e}")))?;
        if bytes.len() != 32 {
            return Err(KeyError::malformed(
                Some(kid),
                &format!("EC {name} is {} bytes, expected 32", bytes.len()),
            ));
        }
        Ok(value)
    }

    fn hmac_key(&self, kid: &str) -> Result<VerificationKey, KeyError> {
        if let Some(alg) = self.alg.as_deref() {
            if alg != "HS256" {
                return Err(KeyError::malformed(
                    Some(kid),
                    &format!("oct key declares alg {alg}"),
                ));
            }
        }
        let secret = self
            .k
            .as_deref()
            .ok_or_else(|| KeyError::malformed(Some(kid), "oct key lacks k"))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(secret)
            .map_err(|e| KeyError::malformed(Some(kid), &format!("oct k: {e}")))?;
        if bytes.is_empty() {
            return Err(KeyError::malformed(Some(kid), "oct key is empty"));
        }
        Ok(VerificationKey {
            kid: kid.to_string(),
            algorithm: KeyAlgorithm::Hmac,
            decoding: DecodingKey::from_secret(&bytes),
        })
    }
}
