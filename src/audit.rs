//! Redaction of request fields before they reach the logs.

use serde_json::{Map, Value};

pub const REDACTED: &str = "[REDACTED]";

pub fn redact_fields(fields: &Map<String, Value>) -> Value {
    redact_value(&Value::Object(fields.clone()))
}

pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive_key(key) {
                        (key.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (key.clone(), redact_value(item))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_value).collect()),
        _ => value.clone(),
    }
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = key.trim().to_ascii_lowercase();
    matches!(
        normalized.as_str(),
        "key" | "authorization" | "bearer" | "credentials" | "credential" | "api_key" | "apikey"
    ) || normalized.ends_with("_key")
        || normalized.contains("token")
        || normalized.contains("secret")
        || normalized.contains("password")
}
