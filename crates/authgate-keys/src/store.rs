use authgate_errors::prelude::labels;
use crate::clock::{Clock, SystemClock};
use crate::errors::KeyError;
use crate::jwk::{RejectedKey, VerificationKey};
use crate::metrics::KeyStoreMetrics;
use crate::source::KeySetSource;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct KeyStoreConfig {
    pub ttl: Duration,
    pub allow_symmetric: bool,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            allow_symmetric: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct KeyCacheEntry {
    pub kid: String,
    pub key: Arc<VerificationKey>,
    pub fetched_at: Instant,
}

/// Result of one fetch of the whole published set.
#[derive(Clone, Debug)]
pub struct KeyRefresh {
    pub keys: Vec<Arc<VerificationKey>>,
    pub rejected: Vec<RejectedKey>,
    pub fetched_at: Instant,
}

struct Listing {
    kids: Vec<String>,
    fetched_at: Instant,
}

/// Resolves key identifiers to verification keys, caching each key for `ttl`.
///
/// Concurrent misses for the same kid may each fetch; the last writer's entry wins
/// and every writer stores the same document.
pub struct KeyStore {
    source: Arc<dyn KeySetSource>,
    clock: Arc<dyn Clock>,
    config: KeyStoreConfig,
    entries: RwLock<HashMap<String, KeyCacheEntry>>,
    listing: RwLock<Option<Listing>>,
    metrics: KeyStoreMetrics,
}

impl KeyStore {
    pub fn new(source: Arc<dyn KeySetSource>, config: KeyStoreConfig) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
            config: KeyStoreConfig {
                ttl: config.ttl.max(Duration::from_millis(1)),
                ..config
            },
            entries: RwLock::new(HashMap::new()),
            listing: RwLock::new(None),
            metrics: KeyStoreMetrics::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn metrics(&self) -> &KeyStoreMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &KeyStoreConfig {
        &self.config
    }

    fn is_fresh(&self, fetched_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(fetched_at) < self.config.ttl
    }

    fn lookup_fresh(&self, kid: &str) -> Option<Arc<VerificationKey>> {
        let now = self.clock.now();
        let entries = self.entries.read();
        entries
            .get(kid)
            .filter(|entry| self.is_fresh(entry.fetched_at, now))
            .map(|entry| entry.key.clone())
    }

    pub async fn get_key(&self, kid: &str) -> Result<Arc<VerificationKey>, KeyError> {
        if kid.is_empty() {
            return Err(KeyError::not_found(kid, "empty key id"));
        }

        if let Some(key) = self.lookup_fresh(kid) {
            self.metrics.record_hit();
            tracing::debug!(kid, "key cache hit");
            return Ok(key);
        }

        self.metrics.record_miss();
        tracing::debug!(kid, "key cache miss");
        let refresh = self.refresh().await?;

        if let Some(key) = refresh.keys.iter().find(|key| key.kid == kid) {
            return Ok(key.clone());
        }
        if let Some(rejected) = refresh.rejected.iter().find(|r| r.kid == kid) {
            return Err(KeyError::malformed(Some(kid), &rejected.reason));
        }
        tracing::warn!(kid, source = %self.source.describe(), "key id not in published set");
        Err(KeyError::not_found(kid, "key id not in published set"))
    }

    /// For tokens without a `kid`: resolves only when the published set holds exactly one usable key.
    pub async fn get_sole_key(&self) -> Result<Arc<VerificationKey>, KeyError> {
        let now = self.clock.now();
        let cached = {
            let listing = self.listing.read();
            listing
                .as_ref()
                .filter(|listing| self.is_fresh(listing.fetched_at, now))
                .map(|listing| listing.kids.clone())
        };

        if let Some(kids) = cached {
            match kids.as_slice() {
                [only] => {
                    if let Some(key) = self.lookup_fresh(only) {
                        self.metrics.record_hit();
                        return Ok(key);
                    }
                }
                _ => return Err(sole_key_ambiguous(kids.len())),
            }
        }

        self.metrics.record_miss();
        let refresh = self.refresh().await?;
        match refresh.keys.as_slice() {
            [only] => Ok(only.clone()),
            keys => Err(sole_key_ambiguous(keys.len())),
        }
    }

    /// Fetches the whole set and replaces the cache entry of every usable key in it.
    pub async fn refresh(&self) -> Result<KeyRefresh, KeyError> {
        self.metrics.record_fetch();
        let set = match self.source.fetch().await {
            Ok(set) => set,
            Err(err) => {
                self.metrics.record_fetch_failure();
                tracing::warn!(
                    source = %self.source.describe(),
                    labels = ?labels(&err.0),
                    "key-set fetch failed"
                );
                return Err(err);
            }
        };

        let parsed = set.into_keys(self.config.allow_symmetric);
        let fetched_at = self.clock.now();
        let keys: Vec<Arc<VerificationKey>> = parsed.keys.into_iter().map(Arc::new).collect();

        {
            let mut entries = self.entries.write();
            for key in &keys {
                entries.insert(
                    key.kid.clone(),
                    KeyCacheEntry {
                        kid: key.kid.clone(),
                        key: key.clone(),
                        fetched_at,
                    },
                );
            }
        }
        *self.listing.write() = Some(Listing {
            kids: keys.iter().map(|key| key.kid.clone()).collect(),
            fetched_at,
        });

        Ok(KeyRefresh {
            keys,
            rejected: parsed.rejected,
            fetched_at,
        })
    }

    pub fn invalidate(&self) {
        self.entries.write().clear();
        *self.listing.write() = None;
        tracing::info!("key cache invalidated");
    }

    pub fn cached_entries(&self) -> Vec<KeyCacheEntry> {
        let mut entries: Vec<_> = self.entries.read().values().cloned().collect();
        entries.sort_by(|a, b| a.kid.cmp(&b.kid));
        entries
    }
}

fn sole_key_ambiguous(count: usize) -> KeyError {
    KeyError::not_found(
        "",
        &format!("token has no kid and the published set holds {count} usable keys"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::jwk::JwkSet;
    use async_trait::async_trait;
    use authgate_errors::prelude::codes;
    use parking_lot::Mutex;
    use serde_json::json;

    const X: &str = "DfwsnDS8ueenwLqygKOgSRPBhJcbV7ZDNwNzf9Fwsus";
    const Y: &str = "riRqwYHYjgR7QVhbAgEm1z7zsQJWmZ0j7EpMIGPhImg";

    struct FakeSource {
        doc: Mutex<serde_json::Value>,
        calls: Mutex<u32>,
    }

    impl FakeSource {
        fn new(doc: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                doc: Mutex::new(doc),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock()
        }
    }

    #[async_trait]
    impl KeySetSource for FakeSource {
        async fn fetch(&self) -> Result<JwkSet, KeyError> {
            *self.calls.lock() += 1;
            serde_json::from_value(self.doc.lock().clone())
                .map_err(|e| KeyError::malformed(None, &e.to_string()))
        }
    }

    fn ec(kid: &str) -> serde_json::Value {
        json!({"kty": "EC", "kid": kid, "crv": "P-256", "x": X, "y": Y})
    }

    fn store(source: Arc<FakeSource>, clock: Arc<ManualClock>) -> KeyStore {
        KeyStore::new(
            source,
            KeyStoreConfig {
                ttl: Duration::from_secs(60),
                allow_symmetric: true,
            },
        )
        .with_clock(clock)
    }

    #[tokio::test]
    async fn empty_kid_never_fetches() {
        let source = FakeSource::new(json!({"keys": [ec("a")]}));
        let store = store(source.clone(), Arc::new(ManualClock::new()));
        let err = store.get_key("").await.unwrap_err();
        assert!(err.into_inner().is(codes::KEYS_NOT_FOUND));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn one_fetch_warms_every_key_in_the_set() {
        let source = FakeSource::new(json!({"keys": [ec("a"), ec("b")]}));
        let store = store(source.clone(), Arc::new(ManualClock::new()));
        store.get_key("a").await.unwrap();
        store.get_key("b").await.unwrap();
        assert_eq!(source.calls(), 1);
        let stats = store.metrics().snapshot();
        assert_eq!((stats.hits, stats.misses, stats.fetches), (1, 1, 1));
    }

    #[tokio::test]
    async fn unknown_kid_refetches_each_time() {
        let source = FakeSource::new(json!({"keys": [ec("a")]}));
        let store = store(source.clone(), Arc::new(ManualClock::new()));
        for _ in 0..2 {
            let err = store.get_key("zzz").await.unwrap_err();
            assert!(err.into_inner().is(codes::KEYS_NOT_FOUND));
        }
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn rejected_material_reports_malformed() {
        let source = FakeSource::new(json!({"keys": [
            {"kty": "EC", "kid": "bad", "crv": "P-256", "x": "AA", "y": Y}
        ]}));
        let store = store(source, Arc::new(ManualClock::new()));
        let err = store.get_key("bad").await.unwrap_err();
        assert!(err.into_inner().is(codes::KEYS_MALFORMED));
    }

    #[tokio::test]
    async fn sole_key_requires_exactly_one() {
        let clock = Arc::new(ManualClock::new());
        let source = FakeSource::new(json!({"keys": [ec("only")]}));
        let store = store(source.clone(), clock.clone());
        assert_eq!(store.get_sole_key().await.unwrap().kid, "only");
        assert_eq!(store.get_sole_key().await.unwrap().kid, "only");
        assert_eq!(source.calls(), 1);

        *source.doc.lock() = json!({"keys": [ec("a"), ec("b")]});
        clock.advance(Duration::from_secs(61));
        let err = store.get_sole_key().await.unwrap_err();
        assert!(err.into_inner().is(codes::KEYS_NOT_FOUND));
        // a fresh ambiguous listing answers without another fetch
        assert!(store.get_sole_key().await.is_err());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let source = FakeSource::new(json!({"keys": [ec("a")]}));
        let store = store(source.clone(), Arc::new(ManualClock::new()));
        store.get_key("a").await.unwrap();
        assert_eq!(store.cached_entries().len(), 1);
        store.invalidate();
        assert!(store.cached_entries().is_empty());
        store.get_key("a").await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn fetch_failure_is_counted_and_propagated() {
        let source = FakeSource::new(json!({"keys": "not-a-list"}));
        let store = store(source, Arc::new(ManualClock::new()));
        let err = store.get_key("a").await.unwrap_err();
        assert!(err.into_inner().is(codes::KEYS_MALFORMED));
        assert_eq!(store.metrics().snapshot().fetch_failures, 1);
    }
}
