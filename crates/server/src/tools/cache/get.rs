//! cache_get tool implementation.
//!
//! Pages through cached source items for a query hash.

use qcache_core::cache::is_query_hash;
use qcache_core::{CacheDb, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Page size used when neither the caller nor the cached rows specify one.
const DEFAULT_RESULTS_PER_PAGE: i64 = 10;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Query hash returned by query_cache.
    pub hash: String,

    /// 1-based page to read (default: 1).
    #[serde(default)]
    pub page: Option<i64>,

    /// Items per page (default: the resultsPerPage the query was cached with).
    #[serde(default, rename = "resultsPerPage")]
    pub results_per_page: Option<i64>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub hash: String,
    pub page: i64,
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: i64,
    /// Total cached items for the hash.
    pub total: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
    /// Source items on this page, in ingest order.
    pub items: Vec<Value>,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(cache: &CacheDb, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    if !is_query_hash(&params.hash) {
        return Err(Error::InvalidHash.into());
    }

    let total = cache.count_records(&params.hash).await?;
    if total == 0 {
        return Err(Error::CacheMiss(params.hash).into());
    }

    let page = params.page.unwrap_or(1);
    let results_per_page = match params.results_per_page {
        Some(n) => n,
        None => cache
            .get_records(&params.hash, 1, 1)
            .await?
            .first()
            .map(|r| r.results)
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_RESULTS_PER_PAGE),
    };

    let records = cache.get_records(&params.hash, page, results_per_page).await?;
    let items = records
        .iter()
        .map(|r| serde_json::from_str(&r.response))
        .collect::<Result<Vec<Value>, _>>()
        .map_err(Error::from)?;

    let output = CacheGetOutput {
        hash: params.hash,
        page,
        results_per_page,
        total,
        total_pages: total.div_ceil(results_per_page as u64),
        items,
    };
    let json = serde_json::to_string_pretty(&output).map_err(Error::from)?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
