//! Error types for Hotmart operations.
//!
//! This module provides the error type shared by every crate in the workspace,
//! including a stable error code per variant and the retry classification used
//! by the HTTP clients.

use thiserror::Error;

/// Main error type for Hotmart operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Date filter did not match `YYYY-MM-DD`
    #[error("Invalid date format (expected YYYY-MM-DD): {0}")]
    InvalidDateFormat(String),

    /// Invalid endpoint or request path
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Credentials were rejected or the token is missing/expired
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Bad request with details
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream rate limit hit
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Hotmart service is unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Operation timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Failed to parse a response body
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Specialized result type for Hotmart operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidDateFormat(_) => "INVALID_DATE_FORMAT",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Timeout(_) => "TIMEOUT",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::ParseError(_) => "PARSE_ERROR",
        }
    }

    /// Returns true if the request that produced this error may succeed on retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::ServiceUnavailable(_) | Self::Timeout(_)
        )
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_) | Self::AuthenticationFailed(_) | Self::ParseError(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            Error::ValidationError("test".to_string()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            Error::InvalidDateFormat("test".to_string()).error_code(),
            "INVALID_DATE_FORMAT"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
        assert_eq!(
            Error::AuthenticationFailed("test".to_string()).error_code(),
            "AUTHENTICATION_FAILED"
        );
        assert_eq!(
            Error::BadRequest("test".to_string()).error_code(),
            "BAD_REQUEST"
        );
        assert_eq!(
            Error::NotFound("test".to_string()).error_code(),
            "NOT_FOUND"
        );
        assert_eq!(
            Error::RateLimited("test".to_string()).error_code(),
            "RATE_LIMITED"
        );
        assert_eq!(
            Error::ServiceUnavailable("test".to_string()).error_code(),
            "SERVICE_UNAVAILABLE"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
        assert_eq!(
            Error::HttpError("test".to_string()).error_code(),
            "HTTP_ERROR"
        );
        assert_eq!(
            Error::ParseError("test".to_string()).error_code(),
            "PARSE_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::ServiceUnavailable("payments".to_string());
        assert_eq!(err.to_string(), "Service unavailable: payments");

        let err = Error::InvalidDateFormat("2024-13-40".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid date format (expected YYYY-MM-DD): 2024-13-40"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited("test".to_string()).is_retryable());
        assert!(Error::ServiceUnavailable("test".to_string()).is_retryable());
        assert!(Error::Timeout("test".to_string()).is_retryable());

        assert!(!Error::NotFound("test".to_string()).is_retryable());
        assert!(!Error::BadRequest("test".to_string()).is_retryable());
        assert!(!Error::AuthenticationFailed("test".to_string()).is_retryable());
    }

    #[test]
    fn test_should_log() {
        assert!(Error::ConfigError("test".to_string()).should_log());
        assert!(Error::AuthenticationFailed("test".to_string()).should_log());
        assert!(Error::ParseError("test".to_string()).should_log());

        assert!(!Error::NotFound("test".to_string()).should_log());
        assert!(!Error::InvalidDateFormat("test".to_string()).should_log());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let hotmart_err: Error = err.into();
        assert!(matches!(hotmart_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let hotmart_err: Error = err.into();
        assert!(matches!(hotmart_err, Error::ParseError(_)));
        assert_eq!(hotmart_err.error_code(), "PARSE_ERROR");
    }

    #[test]
    fn test_error_partial_eq() {
        let err1 = Error::NotFound("test".to_string());
        let err2 = err1.clone();
        let err3 = Error::NotFound("other".to_string());

        assert_eq!(err1, err2);
        assert_ne!(err1, err3);
    }
}
