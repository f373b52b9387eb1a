use serde_json::{Map, Value};

pub fn get_path<'a>(root: &'a Value, dotted: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in dotted.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Writes `value` at `dotted`, replacing any scalar that sits on the path.
pub fn set_path(root: &mut Map<String, Value>, dotted: &str, value: Value) {
    let mut segments: Vec<&str> = dotted.split('.').filter(|s| !s.is_empty()).collect();
    let Some(last) = segments.pop() else {
        return;
    };

    let mut current = root;
    for segment in segments {
        let slot = current
            .entry(segment)
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just made an object"),
        };
    }
    current.insert(last.to_string(), value);
}

/// Env vars and CLI flags arrive as text; numbers and booleans are kept typed.
pub fn parse_scalar(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}

pub fn merge_object(dst: &mut Map<String, Value>, src: Map<String, Value>) {
    for (key, value) in src {
        match (dst.get_mut(&key), value) {
            (Some(Value::Object(dst_obj)), Value::Object(src_obj)) => {
                merge_object(dst_obj, src_obj);
            }
            (_, v) => {
                dst.insert(key, v);
            }
        }
    }
}
