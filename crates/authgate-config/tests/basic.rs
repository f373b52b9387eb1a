use authgate_config::access;
use authgate_config::prelude::*;
use authgate_errors::prelude::codes;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;

#[tokio::test]
async fn layers_merge_in_order_and_snapshot_reads() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        "[keys]\njwks_url = \"https://issuer.example/.well-known/jwks.json\"\ncache_ttl_secs = 300\n"
    )
    .unwrap();

    let loader = Loader::default()
        .with_defaults(json!({"keys": {"cache_ttl_secs": 600, "allow_symmetric": true}}))
        .with_source(Arc::new(FileSource::required(file.path())))
        .with_source(Arc::new(CliArgsSource {
            args: vec!["--keys.cache_ttl_secs=60".into()],
        }));

    let snapshot = loader.load_once().await.expect("snapshot");

    let ttl: u64 = snapshot.get(&KeyPath("keys.cache_ttl_secs".into())).unwrap();
    assert_eq!(ttl, 60);
    let allow: bool = snapshot.get(&KeyPath("keys.allow_symmetric".into())).unwrap();
    assert!(allow);
    let url: String = snapshot.get(&KeyPath("keys.jwks_url".into())).unwrap();
    assert!(url.ends_with("jwks.json"));
    assert!(!snapshot.checksum().as_str().is_empty());

    let layers: Vec<Layer> = snapshot.provenance().iter().map(|p| p.layer).collect();
    assert_eq!(layers, vec![Layer::Defaults, Layer::File, Layer::Cli]);
}

#[tokio::test]
async fn missing_optional_file_is_skipped() {
    let loader = Loader::default().with_source(Arc::new(FileSource {
        paths: vec!["/nonexistent/authgate.yaml".into()],
        required: false,
    }));
    let snapshot = loader.load_once().await.expect("snapshot");
    assert_eq!(snapshot.tree(), &json!({}));
}

#[tokio::test]
async fn missing_required_file_reports_provider_unavailable() {
    let loader = Loader::default().with_source(Arc::new(FileSource::required(
        "/nonexistent/authgate.yaml",
    )));
    let err = loader.load_once().await.unwrap_err();
    assert!(err.into_inner().is(codes::PROVIDER_UNAVAILABLE));
}

#[tokio::test]
async fn malformed_cli_override_is_rejected() {
    let loader = Loader::default().with_source(Arc::new(CliArgsSource {
        args: vec!["--keys.jwks_url".into()],
    }));
    let err = loader.load_once().await.unwrap_err();
    assert!(err.into_inner().is(codes::SCHEMA_VALIDATION));
}

#[tokio::test]
async fn basic_validator_enforces_required_keys() {
    let loader = Loader::default()
        .with_defaults(json!({"verify": {"leeway_secs": 30}}))
        .with_validator(Arc::new(BasicValidator {
            required: vec!["keys.jwks_url".into()],
        }));
    let err = loader.load_once().await.unwrap_err();
    assert_eq!(err.dev_message(), Some("required: keys.jwks_url"));

    let ok = loader
        .load_with(json!({"keys": {"jwks_url": "http://127.0.0.1/jwks"}}))
        .await;
    // load_with validates the base tree first, so the override cannot rescue it.
    assert!(ok.is_err());
}

struct StaticSource;

#[async_trait::async_trait]
impl Source for StaticSource {
    fn id(&self) -> &'static str {
        "static"
    }

    async fn load(&self) -> Result<SourceSnapshot, ConfigError> {
        let mut map = serde_json::Map::new();
        access::set_path(&mut map, "server.bind", json!("0.0.0.0:9000"));
        Ok(SourceSnapshot {
            map,
            provenance: Vec::new(),
        })
    }
}

#[tokio::test]
async fn overrides_apply_on_top_of_sources() {
    let loader = Loader::default().with_source(Arc::new(StaticSource));
    let snapshot = loader
        .load_with(json!({"server": {"bind": "127.0.0.1:1"}}))
        .await
        .unwrap();
    let bind: String = snapshot.get(&KeyPath("server.bind".into())).unwrap();
    assert_eq!(bind, "127.0.0.1:1");
    assert_eq!(snapshot.version().0, "v1-overrides");
}

#[tokio::test]
async fn non_object_override_is_schema_error() {
    let loader = Loader::default();
    let err = loader.load_with(json!([1, 2])).await.unwrap_err();
    assert!(err.into_inner().is(codes::SCHEMA_VALIDATION));
}
