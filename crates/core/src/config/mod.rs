//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (QCACHE_*)
//! 2. TOML config file (if QCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (QCACHE_*)
/// 2. TOML config file (if QCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Endpoint of the external record source.
    ///
    /// Set via QCACHE_SOURCE_URL environment variable.
    /// Required only when an ingest run starts.
    #[serde(default)]
    pub source_url: Option<String>,

    /// Bearer token sent to the record source.
    ///
    /// Set via QCACHE_SOURCE_TOKEN environment variable.
    #[serde(default)]
    pub source_token: Option<String>,

    /// Path to SQLite cache database.
    ///
    /// Set via QCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for source requests.
    ///
    /// Set via QCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// TCP connect timeout for the record source in milliseconds.
    ///
    /// Set via QCACHE_CONNECT_TIMEOUT_MS environment variable.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Wall-clock allowance for one whole ingest run, in seconds.
    ///
    /// Set via QCACHE_RUN_BUDGET_SECS environment variable.
    #[serde(default = "default_run_budget_secs")]
    pub run_budget_secs: u64,

    /// How long an in-flight claim on a query hash stays live, in seconds.
    ///
    /// Set via QCACHE_IN_FLIGHT_TTL_SECS environment variable.
    #[serde(default = "default_in_flight_ttl_secs")]
    pub in_flight_ttl_secs: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./qcache.sqlite")
}

fn default_user_agent() -> String {
    "qcache/0.1".into()
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_run_budget_secs() -> u64 {
    300
}

fn default_in_flight_ttl_secs() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            source_token: None,
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            connect_timeout_ms: default_connect_timeout_ms(),
            run_budget_secs: default_run_budget_secs(),
            in_flight_ttl_secs: default_in_flight_ttl_secs(),
        }
    }
}

impl AppConfig {
    /// Connect timeout as Duration for use with reqwest.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Execution budget for a single ingest run.
    pub fn run_budget(&self) -> Duration {
        Duration::from_secs(self.run_budget_secs)
    }

    /// Lifetime of an in-flight claim.
    pub fn in_flight_ttl(&self) -> Duration {
        Duration::from_secs(self.in_flight_ttl_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `QCACHE_`
    /// 2. TOML file from `QCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("QCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("QCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check that a record source endpoint is configured (deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the source URL is not set.
    pub fn require_source_url(&self) -> Result<&str, ConfigError> {
        self.source_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "source_url".into(),
                hint: "Set QCACHE_SOURCE_URL environment variable".into(),
            })
    }
}
