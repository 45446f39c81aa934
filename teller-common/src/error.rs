//! Error types for the Teller portal.

use thiserror::Error;

/// Result type alias using the portal error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for portal services.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (missing credential, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Authorization error
    #[error("Authorization error: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input or request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Conflicting state (duplicate username, role still in use)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Upstream rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// No warehouse table produced any data
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Warehouse query error
    #[error("Warehouse error: {0}")]
    Warehouse(String),

    /// Text-generation service error
    #[error("Generation error: {0}")]
    Generation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Check if this is a rate limit error.
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// Get HTTP status code for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Auth(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::InvalidInput(_) => 400,
            Self::Conflict(_) => 409,
            Self::RateLimited(_) => 429,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(Error::Auth("test".into()).status_code(), 401);
        assert_eq!(Error::Forbidden("test".into()).status_code(), 403);
        assert_eq!(Error::NotFound("test".into()).status_code(), 404);
        assert_eq!(Error::InvalidInput("test".into()).status_code(), 400);
        assert_eq!(Error::Conflict("test".into()).status_code(), 409);
        assert_eq!(Error::RateLimited("test".into()).status_code(), 429);
        assert_eq!(Error::Config("test".into()).status_code(), 500);
        assert_eq!(Error::DataUnavailable("test".into()).status_code(), 500);
        assert_eq!(Error::Generation("test".into()).status_code(), 500);
        assert_eq!(Error::Internal("test".into()).status_code(), 500);
    }

    #[test]
    fn test_rate_limit_detection() {
        assert!(Error::RateLimited("throttled".into()).is_rate_limited());
        assert!(!Error::Generation("boom".into()).is_rate_limited());
    }
}
