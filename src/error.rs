//! Error types for the mock Bedrock server.
//!
//! Only [`MockError::Validation`] can be produced while serving a request.
//! The remaining variants surface at startup (bad configuration, bind
//! failures) and never reach a client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Top-level error type for the mock server.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    /// The request body was present but could not be parsed as JSON.
    #[error("{0}")]
    Validation(String),

    /// A response payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid server configuration.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error (listener bind, local address lookup).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MockError {
    /// Bedrock exception name reported in the `__type` field.
    pub fn exception_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationException",
            _ => "InternalServerException",
        }
    }

    /// HTTP status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Bedrock-style error body: `{"__type": ..., "message": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Exception name, e.g. `"ValidationException"`.
    #[serde(rename = "__type")]
    pub error_type: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error_type: self.exception_type().to_owned(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, MockError>;
