use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use authgate_auth::prelude::VerifyPolicy;
use authgate_config::errors::{schema_invalid, ConfigError};
use authgate_config::prelude::*;
use authgate_keys::prelude::KeyStoreConfig;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

pub const ENV_PREFIX: &str = "AUTHGATE";
const DEFAULT_CONFIG_PATHS: &[&str] = &["config/authgate.yaml", "config/authgate.toml"];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthgateSettings {
    pub keys: KeySettings,
    pub verify: VerifySettings,
    pub server: ServerSettings,
    pub log: LogSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySettings {
    pub jwks_url: Option<String>,
    pub cache_ttl_secs: u64,
    pub fetch_timeout_ms: u64,
    pub allow_symmetric: bool,
}

impl Default for KeySettings {
    fn default() -> Self {
        Self {
            jwks_url: None,
            cache_ttl_secs: 600,
            fetch_timeout_ms: 5_000,
            allow_symmetric: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifySettings {
    pub leeway_secs: u64,
    pub issuer: Option<String>,
    #[serde(deserialize_with = "one_or_many")]
    pub audience: Option<Vec<String>>,
    pub no_expiry_types: Vec<String>,
}

impl Default for VerifySettings {
    fn default() -> Self {
        Self {
            leeway_secs: 30,
            issuer: None,
            audience: None,
            no_expiry_types: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// `audience = "api"` and `audience = ["api", "admin"]` are both accepted.
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(value)) => Some(vec![value]),
        Some(OneOrMany::Many(values)) => Some(values),
    })
}

impl AuthgateSettings {
    pub fn defaults_tree() -> Result<serde_json::Value, ConfigError> {
        serde_json::to_value(Self::default()).map_err(|e| schema_invalid("defaults", &e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keys.cache_ttl_secs == 0 {
            return Err(schema_invalid("keys.cache_ttl_secs", "must be greater than zero"));
        }
        if self.keys.fetch_timeout_ms == 0 {
            return Err(schema_invalid("keys.fetch_timeout_ms", "must be greater than zero"));
        }
        if let Some(raw) = &self.keys.jwks_url {
            let url = Url::parse(raw).map_err(|e| schema_invalid("keys.jwks_url", &e.to_string()))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(schema_invalid(
                    "keys.jwks_url",
                    &format!("unsupported scheme {}", url.scheme()),
                ));
            }
        }
        if let Some(audience) = &self.verify.audience {
            if audience.is_empty() || audience.iter().any(|a| a.is_empty()) {
                return Err(schema_invalid("verify.audience", "entries must be non-empty"));
            }
        }
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(schema_invalid(
                "server.bind",
                &format!("'{}' is not a socket address", self.server.bind),
            ));
        }
        Ok(())
    }

    pub fn key_store_config(&self) -> KeyStoreConfig {
        KeyStoreConfig {
            ttl: Duration::from_secs(self.keys.cache_ttl_secs),
            allow_symmetric: self.keys.allow_symmetric,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.keys.fetch_timeout_ms)
    }

    pub fn verify_policy(&self) -> VerifyPolicy {
        VerifyPolicy {
            leeway_secs: self.verify.leeway_secs,
            issuer: self.verify.issuer.clone(),
            audience: self.verify.audience.clone(),
            no_expiry_types: self.verify.no_expiry_types.clone(),
        }
    }
}

/// Rejects trees that do not decode into valid settings.
pub struct SettingsValidator;

#[async_trait::async_trait]
impl Validator for SettingsValidator {
    async fn validate_boot(&self, tree: &serde_json::Value) -> Result<(), ConfigError> {
        let settings: AuthgateSettings = serde_json::from_value(tree.clone())
            .map_err(|e| schema_invalid("decode", &e.to_string()))?;
        settings.validate()
    }
}

pub struct LoadedSettings {
    pub settings: AuthgateSettings,
    pub snapshot: ConfigSnapshot,
}

/// Defaults, then the config file, then `AUTHGATE__*` env vars, then `--set` overrides.
pub async fn load_settings(
    config_path: Option<&Path>,
    overrides: &[String],
) -> Result<LoadedSettings, ConfigError> {
    let file = match config_path {
        Some(path) => FileSource::required(path),
        None => FileSource {
            paths: DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).collect(),
            required: false,
        },
    };

    let loader = Loader::default()
        .with_defaults(AuthgateSettings::defaults_tree()?)
        .with_source(Arc::new(file))
        .with_source(Arc::new(EnvSource::new(ENV_PREFIX)))
        .with_source(Arc::new(CliArgsSource {
            args: overrides.to_vec(),
        }))
        .with_validator(Arc::new(SettingsValidator));

    let snapshot = loader.load_once().await?;
    let settings = snapshot.decode::<AuthgateSettings>()?;
    Ok(LoadedSettings { settings, snapshot })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_documented_values() {
        let settings = AuthgateSettings::default();
        assert_eq!(settings.keys.cache_ttl_secs, 600);
        assert_eq!(settings.keys.fetch_timeout_ms, 5_000);
        assert!(settings.keys.allow_symmetric);
        assert_eq!(settings.verify.leeway_secs, 30);
        assert_eq!(settings.server.bind, "127.0.0.1:8787");
        assert_eq!(settings.log.level, "info");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn audience_accepts_string_or_list() {
        let one: VerifySettings = serde_json::from_value(json!({"audience": "api"})).unwrap();
        assert_eq!(one.audience, Some(vec!["api".to_string()]));
        let many: VerifySettings =
            serde_json::from_value(json!({"audience": ["api", "admin"]})).unwrap();
        assert_eq!(many.audience.map(|a| a.len()), Some(2));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut settings = AuthgateSettings::default();
        settings.keys.cache_ttl_secs = 0;
        assert!(settings.validate().is_err());

        let mut settings = AuthgateSettings::default();
        settings.keys.jwks_url = Some("ftp://keys.example/jwks".into());
        assert!(settings.validate().is_err());

        let mut settings = AuthgateSettings::default();
        settings.server.bind = "localhost".into();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn policy_and_store_config_follow_settings() {
        let mut settings = AuthgateSettings::default();
        settings.keys.cache_ttl_secs = 42;
        settings.keys.allow_symmetric = false;
        settings.verify.issuer = Some("https://issuer".into());
        assert_eq!(settings.key_store_config().ttl, Duration::from_secs(42));
        assert!(!settings.key_store_config().allow_symmetric);
        assert_eq!(settings.verify_policy().issuer.as_deref(), Some("https://issuer"));
    }
}
