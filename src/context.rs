//! Per-request field bag handed to the dispatcher and to every handler.

use serde_json::{Map, Value};

pub const DEFAULT_METHOD: &str = "default";
pub const DEFAULT_VERSION: &str = "1.0";

pub const METHOD_FIELD: &str = "method";
pub const VERSION_FIELD: &str = "v";
pub const KEY_FIELD: &str = "key";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    fields: Map<String, Value>,
}

impl RequestContext {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Requested method name, `"default"` when the caller sent none.
    pub fn method(&self) -> String {
        self.text(METHOD_FIELD)
            .unwrap_or_else(|| DEFAULT_METHOD.to_string())
    }

    /// Requested version tag from the `v` field, `"1.0"` when absent.
    pub fn version(&self) -> String {
        self.text(VERSION_FIELD)
            .unwrap_or_else(|| DEFAULT_VERSION.to_string())
    }

    pub fn key(&self) -> Option<String> {
        self.text(KEY_FIELD)
    }

    /// A field counts as present when it exists and is not `null`. Empty
    /// strings are present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Field value as text. Strings are returned as-is, other values as
    /// their JSON encoding.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Overlays `other` on top of this context; its fields win on conflict.
    pub fn merge(&mut self, other: Map<String, Value>) {
        self.fields.extend(other);
    }
}
