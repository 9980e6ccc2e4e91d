//! Per-run record template.

use qcache_core::query::NormalizedFilters;
use qcache_core::{CacheRecord, Error, QueryDefinition};
use serde_json::Value;

/// Fields shared by every record of a run, serialized once.
#[derive(Debug, Clone)]
pub struct RecordTemplate {
    hash: String,
    eol: i64,
    columns: String,
    filters: String,
    results: i64,
    page: i64,
    record_type: String,
    run_date: String,
}

impl RecordTemplate {
    pub fn new(hash: &str, query: &QueryDefinition, filters: &NormalizedFilters, run_date: &str) -> Result<Self, Error> {
        Ok(Self {
            hash: hash.to_string(),
            eol: query.format.eol,
            columns: serde_json::to_string(&query.columns)?,
            filters: serde_json::to_string(filters)?,
            results: query.format.results_per_page,
            page: query.format.page,
            record_type: query.format.record_type.clone(),
            run_date: run_date.to_string(),
        })
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Build the record for the `id`-th item of the run.
    pub fn record(&self, id: i64, item: &Value) -> Result<CacheRecord, Error> {
        Ok(CacheRecord {
            id,
            eol: self.eol,
            columns: self.columns.clone(),
            filters: self.filters.clone(),
            results: self.results,
            page: self.page,
            record_type: self.record_type.clone(),
            response: serde_json::to_string(item)?,
            hash: self.hash.clone(),
            created_at: self.run_date.clone(),
            updated_at: self.run_date.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcache_core::QueryRequest;

    #[test]
    fn test_record_copies_format_fields() {
        let query: QueryRequest = serde_json::from_value(serde_json::json!({
            "columns": [{"name": "id"}, {"name": "sku"}],
            "filters": [{"filter": "a, b", "follow": "AND"}],
            "format": {"type": "item", "resultsPerPage": 25, "page": 2, "cache": true, "eol": 14},
        }))
        .unwrap();
        let query = query.validate().unwrap();
        let filters = query.normalized_filters();
        let template = RecordTemplate::new(&query.hash(), &query, &filters, "2024-05-01 12:00:00").unwrap();

        let record = template.record(9, &serde_json::json!({"sku": "X-1"})).unwrap();
        assert_eq!(record.id, 9);
        assert_eq!(record.eol, 14);
        assert_eq!(record.results, 25);
        assert_eq!(record.page, 2);
        assert_eq!(record.record_type, "item");
        assert_eq!(record.columns, r#"[{"name":"id"},{"name":"sku"}]"#);
        assert_eq!(record.filters, r#"[["a","b"],"AND"]"#);
        assert_eq!(record.response, r#"{"sku":"X-1"}"#);
        assert_eq!(record.hash, query.hash());
        assert_eq!(record.created_at, record.updated_at);
    }
}
