// Error types for gemini-gateway
// Author: kelexine (https://github.com/kelexine)

use crate::generation::Route;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request body exceeds the configured limit")]
    PayloadTooLarge,

    #[error("Gemini API error: {0}")]
    GeminiApi(String),

    #[error("Response blocked: {0}")]
    Blocked(String),

    /// A model call failed; the client only ever sees the route's fixed message.
    #[error("{}", .0.failure_message())]
    GenerationFailed(Route),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Status code this error maps to at the HTTP boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the `error` field of the response body.
    ///
    /// Only caller-facing messages are returned verbatim; anything else is
    /// replaced with a generic message so internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::InvalidRequest(msg) => msg.clone(),
            GatewayError::PayloadTooLarge => self.to_string(),
            GatewayError::GenerationFailed(route) => route.failure_message().to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

// Convert GatewayError to HTTP responses for Axum
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() && !matches!(self, GatewayError::GenerationFailed(_)) {
            tracing::error!("Request failed: {}", self);
        }

        let body = json!({ "error": self.public_message() });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
