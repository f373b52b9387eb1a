use crate::model::ErrorObj;
use std::collections::BTreeMap;

/// Meta keys promoted to log labels when present.
const LABELLED_META: [&str; 2] = ["kid", "alg"];

/// Low-cardinality labels for structured logs.
pub fn labels(err: &ErrorObj) -> BTreeMap<&'static str, String> {
    let mut out = BTreeMap::from([
        ("code", err.code.to_string()),
        ("kind", err.kind.to_string()),
        ("retryable", err.retryable.to_string()),
        ("severity", err.severity.to_string()),
    ]);
    for key in LABELLED_META {
        if let Some(value) = err.meta.get(key) {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out.insert(key, rendered);
        }
    }
    out
}
