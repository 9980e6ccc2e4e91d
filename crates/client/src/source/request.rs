//! Record source request shape.

use qcache_core::Column;
use qcache_core::query::NormalizedFilters;
use serde::Serialize;

/// Fixed page-size ceiling; a page this full means more pages may follow.
pub const PAGE_SIZE: usize = 5000;

/// One page request sent to the record source.
///
/// Serializes to `{lastUpdate, columns, maxResults, filters, offsetPage, type}`.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRequest<'a> {
    /// "Since" marker; always 0 so the full result set is returned.
    #[serde(rename = "lastUpdate")]
    pub since: i64,
    pub columns: &'a [Column],
    #[serde(rename = "maxResults")]
    pub max_results: usize,
    pub filters: &'a NormalizedFilters,
    #[serde(rename = "offsetPage")]
    pub offset_page: u32,
    #[serde(rename = "type")]
    pub record_type: &'a str,
}

impl<'a> SourceRequest<'a> {
    /// Build the request for page `offset_page` of a query.
    pub fn page(columns: &'a [Column], filters: &'a NormalizedFilters, record_type: &'a str, offset_page: u32) -> Self {
        Self { since: 0, columns, max_results: PAGE_SIZE, filters, offset_page, record_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qcache_core::Filter;
    use qcache_core::query::normalize_filters;

    #[test]
    fn test_wire_shape() {
        let columns = vec![Column { name: "internalid".into() }];
        let filters = normalize_filters(&[Filter { filter: "isinactive, is, F".into(), follow: None }]);
        let req = SourceRequest::page(&columns, &filters, "inventoryitem", 2);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "lastUpdate": 0,
                "columns": [{"name": "internalid"}],
                "maxResults": 5000,
                "filters": [["isinactive", "is", "F"], ""],
                "offsetPage": 2,
                "type": "inventoryitem",
            })
        );
    }
}
