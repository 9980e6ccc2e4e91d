//! Unified error types for qcache.
//!
//! Display strings carry a stable `CODE: detail` prefix so tool callers can
//! match on the code without parsing prose.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the qcache service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., no columns requested).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// No cached rows exist for the given hash.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Invalid hash format.
    #[error("CACHE_ERROR: invalid hash format")]
    InvalidHash,

    /// A record could not be serialized for storage.
    #[error("CACHE_ERROR: serialization failed: {0}")]
    Serialization(String),

    /// The external record source failed or returned a non-success status.
    #[error("SOURCE_UNAVAILABLE: failed to connect to external source ({0})")]
    SourceUnavailable(String),

    /// The whole-run execution budget ran out.
    #[error("BUDGET_EXCEEDED: {0}")]
    BudgetExceeded(String),

    /// Required configuration is missing or invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::CacheMiss(_) => -32001,
            Error::Database(_) | Error::MigrationFailed(_) | Error::InvalidHash | Error::Serialization(_) => -32002,
            Error::SourceUnavailable(_) => -32003,
            Error::BudgetExceeded(_) => -32004,
            Error::Config(_) => -32005,
        };
        let message = match &err {
            Error::InvalidInput(msg) | Error::CacheMiss(msg) => msg.clone(),
            _ => err.to_string(),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::CacheMiss("abc123".to_string());
        assert!(err.to_string().contains("CACHE_MISS"));
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn test_source_error_mentions_connection() {
        let err = Error::SourceUnavailable("HTTP 502".to_string());
        let text = err.to_string();
        assert!(text.starts_with("SOURCE_UNAVAILABLE"));
        assert!(text.contains("failed to connect to external source"));
        assert!(text.contains("HTTP 502"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::CacheMiss("abc123".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);

        let mcp_err: McpError = Error::InvalidInput("Please set column values".into()).into();
        assert_eq!(mcp_err.code.0, -32602);
        assert_eq!(mcp_err.message, "Please set column values");

        let mcp_err: McpError = Error::BudgetExceeded("300s".into()).into();
        assert_eq!(mcp_err.code.0, -32004);
    }
}
