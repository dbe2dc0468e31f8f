//! Error types for the GitHub client

use apkbuilder_core::error::{Error, ErrorCode};
use thiserror::Error;

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// GitHub client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The token was rejected
    #[error("GitHub rejected the token ({status})")]
    Unauthorized {
        /// HTTP status code
        status: u16,
    },

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    ApiResponse {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// All retry attempts exhausted
    #[error("All {attempts} retry attempts failed: {last_error}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last error message
        last_error: String,
    },

    /// The `gh` CLI failed to fetch an artifact
    #[error("Artifact download failed: {0}")]
    Download(String),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an API response error
    pub fn api_response(status: u16, message: impl Into<String>) -> Self {
        Self::ApiResponse {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_connect() || e.is_timeout(),
            // 5xx, plus 429 secondary rate limiting
            Self::ApiResponse { status, .. } => *status >= 500 || *status == 429,
            Self::Json(_)
            | Self::Config(_)
            | Self::Unauthorized { .. }
            | Self::RetriesExhausted { .. }
            | Self::Download(_) => false,
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        let code = match &err {
            ApiError::Unauthorized { .. } => ErrorCode::ApiUnauthorized,
            ApiError::ApiResponse { status: 404, .. } => ErrorCode::RunNotFound,
            ApiError::Download(_) => ErrorCode::ArtifactDownloadFailed,
            ApiError::Config(_) => ErrorCode::InvalidConfigValue,
            _ => ErrorCode::ApiError,
        };
        let message = err.to_string();
        let error = Error::new(code, message).with_source(err);
        if code == ErrorCode::ApiUnauthorized {
            error.with_suggestion("Check that the token has the `repo` and `workflow` scopes")
        } else {
            error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apkbuilder_core::ErrorKind;

    #[test]
    fn test_retryable_statuses() {
        assert!(ApiError::api_response(502, "bad gateway").is_retryable());
        assert!(ApiError::api_response(429, "slow down").is_retryable());
        assert!(!ApiError::api_response(404, "missing").is_retryable());
        assert!(!ApiError::Unauthorized { status: 401 }.is_retryable());
    }

    #[test]
    fn test_conversion_is_transport() {
        let err: Error = ApiError::api_response(500, "boom").into();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let err: Error = ApiError::Unauthorized { status: 401 }.into();
        assert_eq!(err.code, ErrorCode::ApiUnauthorized);
        assert!(err.suggestion.is_some());

        let err: Error = ApiError::Download("gh exited 1".into()).into();
        assert_eq!(err.code, ErrorCode::ArtifactDownloadFailed);
    }
}
