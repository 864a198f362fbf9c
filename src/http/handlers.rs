//! Axum HTTP handlers for the web server
//!
//! Provides the dispatch endpoint and the public health/discovery endpoints.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{context::RequestContext, errors::AppError, AppState};

pub const DISPATCH_PATH: &str = "/api";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub endpoint: &'static str,
    pub versions: Vec<String>,
    pub access_control: bool,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn discovery(State(state): State<AppState>) -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        endpoint: DISPATCH_PATH,
        versions: state.dispatcher.registry().versions(),
        access_control: state.dispatcher.access_control_enabled(),
    })
}

/// Every envelope, success or failure, goes out with status 200.
pub async fn dispatch_endpoint(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let mut ctx = RequestContext::new(form_fields(query.unwrap_or_default().as_bytes()));
    ctx.merge(body_fields(&headers, &body)?);

    let envelope = state.dispatcher.handle_request(&ctx);
    let encoded = envelope
        .to_json()
        .map_err(|err| AppError::internal(format!("failed to encode envelope: {err}")))?;

    Ok((
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        encoded,
    )
        .into_response())
}

pub fn form_fields(input: &[u8]) -> Map<String, Value> {
    url::form_urlencoded::parse(input)
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect()
}

/// Body fields by content type. Bodies of other content types are ignored.
pub fn body_fields(headers: &HeaderMap, body: &[u8]) -> Result<Map<String, Value>, AppError> {
    if body.is_empty() {
        return Ok(Map::new());
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match content_type.as_str() {
        "application/json" => match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(_) => Err(AppError::bad_request(
                "invalid_body",
                "json request body must be an object",
            )),
            Err(_) => Err(AppError::bad_request(
                "invalid_json",
                "request body is not valid json",
            )),
        },
        "" | "application/x-www-form-urlencoded" => Ok(form_fields(body)),
        other => {
            debug!(content_type = %other, "ignoring request body");
            Ok(Map::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use serde_json::json;

    use super::*;

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn form_fields_are_percent_decoded() {
        let fields = form_fields(b"method=echo&text=hello%20world&v=1.0");
        assert_eq!(fields["method"], json!("echo"));
        assert_eq!(fields["text"], json!("hello world"));
        assert_eq!(fields["v"], json!("1.0"));
    }

    #[test]
    fn json_body_with_charset_parses() {
        let fields = body_fields(
            &headers("application/json; charset=utf-8"),
            br#"{"text":"hi","n":3}"#,
        )
        .expect("json body");
        assert_eq!(fields["n"], json!(3));
    }

    #[test]
    fn non_object_json_body_is_rejected() {
        let error = body_fields(&headers("application/json"), b"[1,2]")
            .expect_err("array body must fail");
        assert!(error.to_string().contains("bad request"));
    }

    #[test]
    fn unknown_content_type_body_is_ignored() {
        let fields = body_fields(&headers("text/plain"), b"method=echo").expect("ignored body");
        assert!(fields.is_empty());
    }
}
