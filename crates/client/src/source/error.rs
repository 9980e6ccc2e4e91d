//! Record source client error types.

use std::sync::Arc;

/// Errors from the record source client.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// No endpoint configured.
    #[error("missing source endpoint: QCACHE_SOURCE_URL not set")]
    MissingEndpoint,

    /// Endpoint is not a usable http(s) URL.
    #[error("invalid source endpoint: {0}")]
    InvalidEndpoint(String),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { SourceError::Timeout } else { SourceError::Network(Arc::new(err)) }
    }
}

impl From<SourceError> for qcache_core::Error {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::MissingEndpoint | SourceError::InvalidEndpoint(_) => qcache_core::Error::Config(err.to_string()),
            other => qcache_core::Error::SourceUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SourceError::MissingEndpoint;
        assert!(err.to_string().contains("QCACHE_SOURCE_URL"));

        let err = SourceError::Parse("expected value".to_string());
        assert!(err.to_string().contains("parse error"));
    }

    #[test]
    fn test_into_core_error() {
        let err: qcache_core::Error = SourceError::Timeout.into();
        assert!(matches!(err, qcache_core::Error::SourceUnavailable(_)));

        let err: qcache_core::Error = SourceError::InvalidEndpoint("ftp://x".into()).into();
        assert!(matches!(err, qcache_core::Error::Config(_)));
    }
}
