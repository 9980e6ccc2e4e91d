//! Inbound request validation.
//!
//! Turns a loosely shaped [`QueryRequest`] into a [`QueryDefinition`],
//! applying defaults and rejecting malformed input before any fetch begins.

use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{Column, Filter, Format, QueryDefinition};
use crate::Error;

const DEFAULT_RESULTS_PER_PAGE: i64 = 10;
const DEFAULT_PAGE: i64 = 1;

/// Inbound query request as received from a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct QueryRequest {
    /// Columns to fetch, in order. Order participates in the cache key.
    #[serde(default, deserialize_with = "column_list")]
    #[schemars(with = "Option<Vec<Column>>")]
    pub columns: Option<Vec<Column>>,

    /// Optional filters, in order. Order participates in the cache key.
    #[serde(default)]
    pub filters: Option<Vec<Filter>>,

    /// Output format and caching options.
    #[serde(default)]
    pub format: Option<FormatRequest>,
}

/// Format block of an inbound request; everything but `type` has a default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FormatRequest {
    /// Record type to request from the source (required).
    #[serde(rename = "type", default)]
    pub record_type: Option<String>,

    /// Results per page when reading the cache back (default 10).
    #[serde(rename = "resultsPerPage", default)]
    pub results_per_page: Option<i64>,

    /// Page to read back (default 1, must be >= 1).
    #[serde(default)]
    pub page: Option<i64>,

    /// Whether the caller wants the result kept (default false).
    #[serde(default)]
    pub cache: Option<bool>,

    /// Expiry marker stored on every row; required when `cache` is true.
    #[serde(default)]
    pub eol: Option<i64>,
}

/// Anything other than an array reads as absent so it gets the same answer
/// as a missing `columns` key.
fn column_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<Column>>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => serde_json::from_value(Value::Array(items))
            .map(Some)
            .map_err(D::Error::custom),
        _ => Ok(None),
    }
}

impl QueryRequest {
    /// Validate the request and fill in defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` when columns are missing or empty, the format
    /// block or its type is missing, caching is requested without an `eol`,
    /// or the page is not positive.
    pub fn validate(self) -> Result<QueryDefinition, Error> {
        let columns = self
            .columns
            .ok_or_else(|| Error::InvalidInput("Please set an array of columns to fetch".into()))?;
        if columns.is_empty() {
            return Err(Error::InvalidInput("Please set column values".into()));
        }
        if columns.iter().any(|c| c.name.is_empty()) {
            return Err(Error::InvalidInput("Column names must not be empty".into()));
        }

        let format = self
            .format
            .ok_or_else(|| Error::InvalidInput("Please specify format data".into()))?;

        let record_type = format
            .record_type
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidInput("Please set a format type".into()))?;

        let cache = format.cache.unwrap_or(false);
        let eol = match (format.cache, format.eol) {
            (_, Some(eol)) => eol,
            (Some(true), None) => return Err(Error::InvalidInput("Please designate an eol value".into())),
            (_, None) => 0,
        };

        let page = format.page.unwrap_or(DEFAULT_PAGE);
        if page <= 0 {
            return Err(Error::InvalidInput("Invalid page selected, this must be 1 or greater".into()));
        }

        let results_per_page = format.results_per_page.unwrap_or(DEFAULT_RESULTS_PER_PAGE);
        if results_per_page <= 0 {
            return Err(Error::InvalidInput("resultsPerPage must be 1 or greater".into()));
        }

        Ok(QueryDefinition {
            columns,
            filters: self.filters.unwrap_or_default(),
            format: Format { record_type, results_per_page, page, cache, eol },
        })
    }
}
