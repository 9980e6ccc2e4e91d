//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err.to_string())
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `connect_timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `run_budget_secs` is 0 or exceeds one hour
    /// - `in_flight_ttl_secs` is 0
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "connect_timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.connect_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "connect_timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.run_budget_secs == 0 {
            return Err(ConfigError::Invalid { field: "run_budget_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.run_budget_secs > 3600 {
            return Err(ConfigError::Invalid {
                field: "run_budget_secs".into(),
                reason: "must not exceed one hour (3600s)".into(),
            });
        }

        if self.in_flight_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "in_flight_ttl_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.source_token.is_some() && self.source_url.is_none() {
            tracing::warn!("source_token is set without source_url; the token is unused until a source is configured");
        }

        Ok(())
    }
}
