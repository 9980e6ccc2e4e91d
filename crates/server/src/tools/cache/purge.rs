//! cache_purge tool implementation.
//!
//! Deletes every cached row for a query hash.

use qcache_core::cache::is_query_hash;
use qcache_core::{CacheDb, Error};
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Query hash whose rows should be deleted.
    pub hash: String,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of rows deleted.
    pub deleted: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(cache: &CacheDb, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if !is_query_hash(&params.hash) {
        return Err(Error::InvalidHash.into());
    }

    let deleted = cache.delete_records(&params.hash).await?;
    tracing::info!(hash = %params.hash, deleted, "purged cached query");

    let output = CachePurgeOutput { deleted };
    let json = serde_json::to_string_pretty(&output).map_err(Error::from)?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
