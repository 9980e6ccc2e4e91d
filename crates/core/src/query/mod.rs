//! Query definitions: what to fetch from the record source and how to file it.
//!
//! A [`QueryDefinition`] is built once per ingest run from an inbound
//! [`QueryRequest`] and is never persisted itself; its columns, normalized
//! filters and format fields are copied onto every cached row.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod filters;
pub mod validation;

pub use filters::{FilterSlot, NormalizedFilters, normalize_filters};
pub use validation::{FormatRequest, QueryRequest};

/// A single column requested from the record source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
}

/// A filter expression: comma-separated clauses plus an optional joining operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Filter {
    /// Clauses separated by `", "`.
    pub filter: String,
    /// Operator token joining this filter to the next one (e.g. `AND`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow: Option<String>,
}

/// Output shape requested for the cached rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Format {
    /// Record type passed through to the source.
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: i64,
    pub page: i64,
    pub cache: bool,
    pub eol: i64,
}

/// A validated query, ready to drive an ingest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDefinition {
    pub columns: Vec<Column>,
    pub filters: Vec<Filter>,
    pub format: Format,
}

impl QueryDefinition {
    /// Derive the cache key for this query.
    pub fn hash(&self) -> String {
        crate::cache::hash::compute_query_hash(&self.columns, &self.filters)
    }

    /// Flatten the filters into the transport shape expected by the source.
    pub fn normalized_filters(&self) -> NormalizedFilters {
        normalize_filters(&self.filters)
    }
}
