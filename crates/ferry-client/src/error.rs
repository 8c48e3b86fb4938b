//! Error types for the upstream ferry API client.

use thiserror::Error;

/// Result type for upstream operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur when talking to the upstream ferry API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (including timeouts after retry exhaustion).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Failed to parse a JSON response.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Upstream returned a non-retryable error status.
    #[error("upstream error {status}: {message}")]
    Api { status: u16, message: String },

    /// A request did not complete within the upstream timeout.
    #[error("request to {0} timed out")]
    Timeout(String),

    /// The access code required by the upstream API was not configured.
    #[error("upstream access code required but not configured")]
    MissingAccessCode,
}

impl ApiError {
    /// True for conditions the retry loop in [`crate::client::UpstreamClient`]
    /// should attempt again: connection/reset/timeout errors and upstream
    /// 5xx responses. 4xx responses and parse errors are not retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::Api { status, .. } => *status >= 500,
            ApiError::Timeout(_) => true,
            ApiError::Parse(_) | ApiError::MissingAccessCode => false,
        }
    }
}
