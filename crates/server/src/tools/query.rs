//! query_cache tool implementation.
//!
//! Validates a query, claims its hash and runs the ingest pipeline to
//! completion. A second call for the same hash while the first still holds
//! the claim returns `in_progress` without touching the source.

use qcache_client::{Ingestor, RecordSource};
use qcache_core::{AppConfig, CacheDb, Error, InFlightCache, QueryRequest};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the query_cache tool.
pub type QueryCacheParams = QueryRequest;

/// Whether this call ran the query or found it already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryState {
    Complete,
    InProgress,
}

/// Output from the query_cache tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryCacheOutput {
    /// Hash the results are cached under.
    pub hash: String,
    pub state: QueryState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batches: Option<usize>,
}

impl QueryCacheOutput {
    fn in_progress(hash: String) -> Self {
        Self { hash, state: QueryState::InProgress, run_date: None, pages: None, records: None, batches: None }
    }
}

/// Implementation of the query_cache tool.
pub async fn query_impl(
    source: &dyn RecordSource, cache: &CacheDb, in_flight: &InFlightCache, config: &AppConfig,
    params: QueryCacheParams,
) -> Result<CallToolResult, McpError> {
    let query = params.validate()?;
    let hash = query.hash();

    let output = if in_flight.try_claim(&hash).await {
        let summary = Ingestor::new(source, cache, in_flight)
            .with_budget(config.run_budget())
            .run(&query)
            .await?;
        QueryCacheOutput {
            hash: summary.hash,
            state: QueryState::Complete,
            run_date: Some(summary.run_date),
            pages: Some(summary.pages),
            records: Some(summary.records),
            batches: Some(summary.batches),
        }
    } else {
        tracing::info!(hash = %hash, "query already in flight, skipping run");
        QueryCacheOutput::in_progress(hash)
    };

    let json = serde_json::to_string_pretty(&output).map_err(Error::from)?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
