//! Error types for the caching proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Proxy Error Enum ==
/// Unified error type for the cache and the fetch client.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// TTL was zero; only strictly positive or infinite TTLs are accepted
    #[error("TTL must be a positive duration or infinite")]
    InvalidTtl,

    /// Outbound transfer exceeded the configured timeout (milliseconds)
    #[error("Request timed out after {0}ms")]
    RequestTimeout(u64),

    /// Any other network-layer failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was required to be JSON but was not
    #[error("Failed to parse JSON response: {0}")]
    InvalidJsonResponse(serde_json::Error),

    /// The request could not be built (bad method, header or body)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No target URL given and no default configured
    #[error("Missing target URL. Provide ?url=... or set API_URL.")]
    MissingTargetUrl,
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::MissingTargetUrl | ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::InvalidTtl => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::RequestTimeout(_)
            | ProxyError::Transport(_)
            | ProxyError::InvalidJsonResponse(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
