//! Error types for the Gateway

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nyaya_bridge::BridgeError;
use nyaya_core::CoreError;
use thiserror::Error;

/// Gateway error type
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("Backend error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Serialization(e.to_string())
    }
}

impl GatewayError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Core(CoreError::IncompleteReport)
            | GatewayError::Core(CoreError::UnknownField(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Core(CoreError::Bridge(_)) | GatewayError::Bridge(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Serialization(_) => StatusCode::BAD_REQUEST,
            GatewayError::InvalidConfig(_) | GatewayError::Io(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type for Gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
