pub use crate::{
    clock::{Clock, ManualClock, SystemClock},
    errors::KeyError,
    jwk::{Jwk, JwkSet, KeyAlgorithm, ParsedKeys, RejectedKey, VerificationKey},
    metrics::{KeyStoreMetrics, KeyStoreStats},
    source::{HttpKeySetSource, KeySetSource},
    store::{KeyCacheEntry, KeyRefresh, KeyStore, KeyStoreConfig},
};
