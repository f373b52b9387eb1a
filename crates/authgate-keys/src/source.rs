use crate::errors::KeyError;
use crate::jwk::JwkSet;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use url::Url;

/// Where the published key set comes from.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, KeyError>;

    fn describe(&self) -> String {
        "key-set source".to_string()
    }
}

/// Fetches the key set with a single bounded GET. No retries.
#[derive(Clone)]
pub struct HttpKeySetSource {
    url: Url,
    client: reqwest::Client,
}

impl HttpKeySetSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, KeyError> {
        let url = Url::parse(url)
            .map_err(|e| KeyError::unavailable(&format!("invalid key-set url {url}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(KeyError::unavailable(&format!(
                "unsupported key-set url scheme {}",
                url.scheme()
            )));
        }
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| KeyError::unavailable(&format!("http client: {e}")))?;
        Ok(Self { url, client })
    }

    pub fn with_client(url: Url, client: reqwest::Client) -> Self {
        Self { url, client }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

fn map_reqwest(phase: &str, err: reqwest::Error) -> KeyError {
    if err.is_timeout() {
        KeyError::timeout(phase)
    } else {
        KeyError::unavailable(&format!("{phase}: {err}"))
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    async fn fetch(&self) -> Result<JwkSet, KeyError> {
        let start = Instant::now();
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| map_reqwest("key-set request", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeyError::unavailable(&format!(
                "key-set endpoint answered {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest("key-set body", e))?;
        let set: JwkSet = serde_json::from_slice(&body)
            .map_err(|e| KeyError::malformed(None, &format!("key-set document: {e}")))?;

        tracing::info!(
            url = %self.url,
            keys = set.keys.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetched published key set"
        );
        Ok(set)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgate_errors::prelude::codes;

    #[test]
    fn rejects_non_http_urls() {
        let err = HttpKeySetSource::new("file:///etc/jwks.json", Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(err.into_inner().is(codes::KEYS_UNAVAILABLE));
        assert!(HttpKeySetSource::new("not a url", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn keeps_url() {
        let source =
            HttpKeySetSource::new("https://issuer.example/.well-known/jwks.json", Duration::from_secs(1))
                .unwrap();
        assert_eq!(source.url().path(), "/.well-known/jwks.json");
        assert_eq!(source.describe(), "https://issuer.example/.well-known/jwks.json");
    }
}
