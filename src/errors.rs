use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::envelope::{wrap_error, ResponseEnvelope};

pub const UNKNOWN_METHOD: i64 = 1;
pub const MISSING_PARAMS: i64 = 2;
pub const ACCESS_DENIED: i64 = 3;

/// Failure outcome of a single dispatch.
///
/// The first three variants are raised by the dispatcher itself and carry the
/// reserved codes. `Application` is how handlers report their own failures;
/// its code, message and extra fields pass through untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("unknown method")]
    UnknownMethod,
    #[error("{0} is a required parameter")]
    MissingParam(String),
    #[error("access denied")]
    AccessDenied,
    #[error("{message}")]
    Application {
        code: i64,
        message: String,
        extra: Map<String, Value>,
    },
}

impl DispatchError {
    pub fn missing_param(name: impl Into<String>) -> Self {
        Self::MissingParam(name.into())
    }

    pub fn application(code: i64, message: impl Into<String>) -> Self {
        Self::Application {
            code,
            message: message.into(),
            extra: Map::new(),
        }
    }

    /// Attaches an extra field to an application error. Structural errors
    /// carry no extra fields and are returned unchanged.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Self::Application { extra, .. } = &mut self {
            extra.insert(key.into(), value.into());
        }
        self
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::UnknownMethod => UNKNOWN_METHOD,
            Self::MissingParam(_) => MISSING_PARAMS,
            Self::AccessDenied => ACCESS_DENIED,
            Self::Application { code, .. } => *code,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn into_envelope(self) -> ResponseEnvelope {
        let code = self.code();
        let message = self.message();
        let extra = match self {
            Self::Application { extra, .. } => extra,
            _ => Map::new(),
        };
        wrap_error(code, message, extra)
    }
}

/// Transport-level failures, raised before a request reaches the dispatcher.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest {
        code: &'static str,
        message: &'static str,
    },
    #[error("internal error")]
    Internal { code: &'static str, message: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Value,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: &'static str) -> Self {
        Self::BadRequest { code, message }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: "internal_error",
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, code, message.to_string())
            }
            Self::Internal { code, message } => {
                tracing::error!(error = %message, "request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                code: code.to_string(),
                message,
                details: json!({}),
            }),
        )
            .into_response()
    }
}
