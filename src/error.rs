//! Error types for the HTTP layer
//!
//! Provides unified error handling using thiserror. The cache core itself is
//! infallible; every variant here originates at the transport boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

// == API Error Enum ==
/// Unified error type for request handling.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body is not a valid `{"key": int, "value": string}` document
    #[error("Invalid request body")]
    InvalidBody(#[source] serde_json::Error),

    /// Query parameter `key` is missing or not an integer
    #[error("Invalid key")]
    InvalidKey,

    /// Key not present in the cache
    #[error("Key not found in cache")]
    NotFound(i64),

    /// Request log could not be read
    #[error("{0}")]
    LogUnavailable(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) | ApiError::InvalidKey => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::LogUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::InvalidBody(err) => warn!(%err, "rejected request body"),
            ApiError::LogUnavailable(err) => error!(%err, "failed to read request log"),
            ApiError::InvalidKey | ApiError::NotFound(_) => {}
        }

        // Plain-text body, newline terminated
        (status, format!("{}\n", self)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
