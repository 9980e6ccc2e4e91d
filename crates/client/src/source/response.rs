//! Record source response types.

use serde::Deserialize;
use serde_json::Value;

use super::SourceError;

/// Raw response body from the record source.
///
/// `items` is required: a success status whose body lacks it (the source's
/// error envelope, for instance) is a failed page, not an empty one.
#[derive(Debug, Deserialize)]
pub struct SourceApiResponse {
    pub items: Vec<Value>,
}

impl SourceApiResponse {
    pub fn from_slice(body: &[u8]) -> Result<Self, SourceError> {
        serde_json::from_slice(body).map_err(|e| SourceError::Parse(e.to_string()))
    }
}

/// One page as seen by the ingest pipeline.
///
/// Items are opaque; they are stored verbatim as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub status_code: u16,
    pub items: Vec<Value>,
}

impl FetchResult {
    /// A successful page carrying `items`.
    pub fn ok(items: Vec<Value>) -> Self {
        Self { status_code: 200, items }
    }

    /// A failed page with the given status and no items.
    pub fn status(status_code: u16) -> Self {
        Self { status_code, items: Vec::new() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_items() {
        let body = r#"{"items":[{"id":"1"},{"id":"2"}],"total":2}"#;
        let parsed: SourceApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[1]["id"], "2");
    }

    #[test]
    fn test_missing_items_is_rejected() {
        let body = br#"{"error":{"code":"SSS_REQUEST_LIMIT_EXCEEDED","message":"Request limit exceeded"}}"#;
        assert!(matches!(SourceApiResponse::from_slice(body), Err(SourceError::Parse(_))));
        assert!(matches!(SourceApiResponse::from_slice(b"{}"), Err(SourceError::Parse(_))));
    }

    #[test]
    fn test_empty_items_is_empty_page() {
        let parsed = SourceApiResponse::from_slice(br#"{"items":[]}"#).unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn test_success_range() {
        assert!(FetchResult::ok(vec![]).is_success());
        assert!(FetchResult::status(204).is_success());
        assert!(!FetchResult::status(400).is_success());
        assert!(!FetchResult::status(503).is_success());
        assert!(!FetchResult::status(301).is_success());
    }
}
