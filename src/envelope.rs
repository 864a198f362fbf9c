//! The JSON envelope every dispatch ends in.
//!
//! Success: `{"ok":true,"result":{...}}`. Failure:
//! `{"ok":false,"error":{"code":N,"msg":"...",...extra}}`.

use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    Success(Map<String, Value>),
    Failure(Map<String, Value>),
}

impl ResponseEnvelope {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Error code of a failure envelope, `None` on success.
    pub fn error_code(&self) -> Option<i64> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => error.get("code").and_then(Value::as_i64),
        }
    }

    /// Serializes the envelope as compact UTF-8 JSON. Non-ASCII text is
    /// written as-is rather than `\u` escaped.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for ResponseEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            Self::Success(result) => {
                map.serialize_entry("ok", &true)?;
                map.serialize_entry("result", result)?;
            }
            Self::Failure(error) => {
                map.serialize_entry("ok", &false)?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

pub fn wrap_result(data: Map<String, Value>) -> ResponseEnvelope {
    ResponseEnvelope::Success(data)
}

/// Builds a failure envelope. `code` and `msg` always win over keys of the
/// same name in `extra`.
pub fn wrap_error(
    code: i64,
    message: impl Into<String>,
    mut extra: Map<String, Value>,
) -> ResponseEnvelope {
    extra.insert("code".to_string(), Value::from(code));
    extra.insert("msg".to_string(), Value::String(message.into()));
    ResponseEnvelope::Failure(extra)
}
