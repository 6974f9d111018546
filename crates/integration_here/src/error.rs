//! HERE client error types

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur while talking to the HERE APIs
///
/// Empty geocoding results, missing routes and matrix error payloads are
/// not errors; they are reported through sentinel values instead.
#[derive(Debug, Error)]
pub enum HereError {
    /// Connection to the HERE service failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP request returned a non-success status
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the response body
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying (if provided by API)
        retry_after_secs: Option<u64>,
    },

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// Caller input rejected before any request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] DomainError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl HereError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::RequestFailed(_)
                | Self::Timeout { .. }
                | Self::RateLimitExceeded { .. }
        )
    }
}
