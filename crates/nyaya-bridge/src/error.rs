//! Error types for the bridges

use thiserror::Error;

/// Bridge error type
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

impl From<BridgeError> for nyaya_core::CoreError {
    fn from(e: BridgeError) -> Self {
        nyaya_core::CoreError::bridge(e)
    }
}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
