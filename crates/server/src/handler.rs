//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl, purge_impl};
use crate::tools::query::{QueryCacheParams, query_impl};

use qcache_client::SourceClient;
use qcache_core::{AppConfig, CacheDb, Error, InFlightCache};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for qcache.
#[derive(Clone)]
pub struct QcacheServer {
    tool_router: ToolRouter<Self>,
    config: AppConfig,
    db: CacheDb,
    in_flight: InFlightCache,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl QcacheServer {
    /// Create a new server handler.
    pub fn new(config: AppConfig, db: CacheDb) -> Self {
        let in_flight = InFlightCache::new(config.in_flight_ttl());
        Self { tool_router: Self::tool_router(), config, db, in_flight }
    }

    /// Fetch every page of a query from the record source into the cache.
    #[tool(description = "Fetch all pages of a query from the record source and cache them under the query hash. \
                          Returns the hash and run statistics, or in_progress if an identical query is running.")]
    async fn query_cache(&self, params: Parameters<QueryCacheParams>) -> Result<CallToolResult, McpError> {
        let source = SourceClient::from_app_config(&self.config).map_err(Error::from)?;
        query_impl(&source, &self.db, &self.in_flight, &self.config, params.0).await
    }

    /// Read cached records for a query hash.
    #[tool(description = "Read one page of cached records for a query hash.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.db, params.0).await
    }

    /// Delete cached records for a query hash.
    #[tool(description = "Delete every cached record for a query hash.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.db, params.0).await
    }
}

impl ServerHandler for QcacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "qcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
