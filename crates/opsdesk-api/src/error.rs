//! Internal error types for backend API operations.
//!
//! These errors are internal to `opsdesk-api` and are mapped to the core
//! port's `TransportError` at the boundary.

use thiserror::Error;

/// Result type alias for backend API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors related to inbox backend API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with an error status, or a `success: false`
    /// envelope.
    #[error("API request failed with status {status}: {url}")]
    RequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
        /// Server-provided error message, when the envelope carried one
        message: Option<String>,
    },

    /// API returned an invalid or unexpected response.
    #[error("Invalid response from inbox API: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
