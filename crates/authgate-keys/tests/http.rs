use authgate_errors::prelude::codes;
use authgate_keys::prelude::*;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

const X: &str = "DfwsnDS8ueenwLqygKOgSRPBhJcbV7ZDNwNzf9Fwsus";
const Y: &str = "riRqwYHYjgR7QVhbAgEm1z7zsQJWmZ0j7EpMIGPhImg";

async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service()).await;
    });
    addr
}

fn jwks() -> Value {
    json!({"keys": [
        {"kty": "EC", "kid": "ec-1", "crv": "P-256", "x": X, "y": Y, "alg": "ES256", "use": "sig"},
        {"kty": "RSA", "kid": "rsa-1", "n": "AQAB", "e": "AQAB", "alg": "RS256"}
    ]})
}

fn store_for(url: &str, timeout: Duration) -> KeyStore {
    let source = HttpKeySetSource::new(url, timeout).expect("source");
    KeyStore::new(Arc::new(source), KeyStoreConfig::default())
}

#[tokio::test]
async fn resolves_key_from_served_document() {
    let addr = spawn(Router::new().route("/jwks", get(|| async { Json(jwks()) }))).await;
    let store = store_for(&format!("http://{addr}/jwks"), Duration::from_secs(5));

    let key = store.get_key("ec-1").await.expect("key");
    assert_eq!(key.algorithm, KeyAlgorithm::EcP256);

    let err = store.get_key("rsa-1").await.unwrap_err();
    assert!(err.into_inner().is(codes::KEYS_NOT_FOUND));
}

#[tokio::test]
async fn slow_endpoint_times_out() {
    let app = Router::new().route(
        "/jwks",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(jwks())
        }),
    );
    let addr = spawn(app).await;
    let store = store_for(&format!("http://{addr}/jwks"), Duration::from_millis(100));

    let err = store.get_key("ec-1").await.unwrap_err();
    assert!(err.into_inner().is(codes::KEYS_TIMEOUT));
}

#[tokio::test]
async fn error_status_is_unavailable() {
    let app = Router::new().route(
        "/jwks",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
    );
    let addr = spawn(app).await;
    let store = store_for(&format!("http://{addr}/jwks"), Duration::from_secs(5));

    let err = store.get_key("ec-1").await.unwrap_err();
    assert!(err.into_inner().is(codes::KEYS_UNAVAILABLE));
    assert_eq!(store.metrics().snapshot().fetch_failures, 1);
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let addr = spawn(Router::new().route("/jwks", get(|| async { "<html>" }))).await;
    let store = store_for(&format!("http://{addr}/jwks"), Duration::from_secs(5));

    let err = store.get_key("ec-1").await.unwrap_err();
    assert!(err.into_inner().is(codes::KEYS_MALFORMED));
}

#[tokio::test]
async fn unreachable_endpoint_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let store = store_for(&format!("http://{addr}/jwks"), Duration::from_secs(2));

    let err = store.get_key("ec-1").await.unwrap_err();
    let code = err.code();
    assert!(code == codes::KEYS_UNAVAILABLE || code == codes::KEYS_TIMEOUT);
}
