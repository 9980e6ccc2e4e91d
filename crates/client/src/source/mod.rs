//! External record source client.
//!
//! ### Protocol
//!
//! - **Transport**: `POST` of a JSON page request to a single endpoint.
//! - **Authentication**: optional bearer token.
//! - **Paging**: `offsetPage` selects the page; at most [`PAGE_SIZE`] items per page.
//! - **Timeouts**: only a connect timeout. Whole-run time limits belong to
//!   the ingest pipeline, not to individual requests.
//!
//! The ingest pipeline talks to the source through [`RecordSource`], so tests
//! can substitute an in-memory implementation.

pub mod error;
pub mod request;
pub mod response;

pub use error::SourceError;
pub use request::{PAGE_SIZE, SourceRequest};
pub use response::{FetchResult, SourceApiResponse};

use async_trait::async_trait;
use qcache_core::AppConfig;
use reqwest::header;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default connect timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "qcache/0.1";

/// Anything that can answer a page request.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Issue exactly one page request.
    ///
    /// Non-success HTTP statuses are reported through
    /// [`FetchResult::status_code`]; transport and parse failures are errors.
    async fn fetch_page(&self, request: &SourceRequest<'_>) -> Result<FetchResult, SourceError>;
}

/// Record source client configuration.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Endpoint receiving page requests.
    pub endpoint: String,
    /// Bearer token, if the source requires one.
    pub token: Option<String>,
    /// TCP connect timeout (default: 10s).
    pub connect_timeout: Duration,
    /// User-agent string (default: qcache/0.x).
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            token: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl SourceConfig {
    /// Build a source configuration from the application config.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SourceError> {
        let endpoint = config.require_source_url().map_err(|_| SourceError::MissingEndpoint)?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            token: config.source_token.clone(),
            connect_timeout: config.connect_timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// HTTP client for the external record source.
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: reqwest::Client,
    endpoint: url::Url,
    config: SourceConfig,
}

impl SourceClient {
    /// Create a new source client with the given configuration.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        if config.endpoint.is_empty() {
            return Err(SourceError::MissingEndpoint);
        }

        let endpoint = url::Url::parse(&config.endpoint).map_err(|e| SourceError::InvalidEndpoint(e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SourceError::InvalidEndpoint(format!("unsupported scheme: {}", endpoint.scheme())));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .gzip(true)
            .build()
            .map_err(|e| SourceError::Network(Arc::new(e)))?;

        Ok(Self { http, endpoint, config })
    }

    /// Create a new source client from the application config.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SourceError> {
        Self::new(SourceConfig::from_app_config(config)?)
    }
}

#[async_trait]
impl RecordSource for SourceClient {
    async fn fetch_page(&self, request: &SourceRequest<'_>) -> Result<FetchResult, SourceError> {
        let start = Instant::now();

        tracing::debug!(offset = request.offset_page, record_type = request.record_type, "requesting source page");

        let mut builder = self
            .http
            .post(self.endpoint.clone())
            .header(header::ACCEPT, "application/json")
            .json(request);
        if let Some(token) = &self.config.token {
            builder = builder.bearer_auth(token);
        }

        let http_response = builder.send().await?;
        let status = http_response.status();
        tracing::debug!(offset = request.offset_page, %status, "source response status");

        if !status.is_success() {
            return Ok(FetchResult::status(status.as_u16()));
        }

        let bytes = http_response.bytes().await?;
        let body = SourceApiResponse::from_slice(&bytes)?;

        tracing::debug!(
            offset = request.offset_page,
            items = body.items.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "source page received"
        );

        Ok(FetchResult { status_code: status.as_u16(), items: body.items })
    }
}
