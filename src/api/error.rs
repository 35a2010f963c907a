//! Error types for the webby server API

use thiserror::Error;

/// Errors that can occur when talking to the webby server
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with an error status
    #[error("Server error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the `{"error": ...}` body, or the raw body
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured server URL is unusable
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    /// Check if this error requires logging in again
    pub fn requires_reauth(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }

    /// Check if retrying the same request might succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            ApiError::Request(err) => err.is_timeout() || err.is_connect(),
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::Json(_) | ApiError::InvalidUrl(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ApiError {
        ApiError::Status { status: code, message: "nope".into() }
    }

    #[test]
    fn not_found_is_detected() {
        assert!(status(404).is_not_found());
        assert!(!status(500).is_not_found());
    }

    #[test]
    fn auth_failures_require_reauth() {
        assert!(status(401).requires_reauth());
        assert!(status(403).requires_reauth());
        assert!(!status(404).requires_reauth());
    }

    #[test]
    fn server_errors_are_recoverable() {
        assert!(status(503).is_recoverable());
        assert!(!status(400).is_recoverable());
    }

    #[test]
    fn status_message_is_displayed() {
        assert_eq!(status(418).to_string(), "Server error (418): nope");
    }
}
