//! Paginated fetch loop against the record source.

use qcache_core::query::NormalizedFilters;
use qcache_core::{Column, Error};
use serde::Serialize;
use serde_json::Value;

use super::budget::ExecutionBudget;
use super::record::RecordTemplate;
use super::writer::CacheWriter;
use crate::source::{PAGE_SIZE, RecordSource, SourceRequest};

/// Fetcher state; `Complete` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchState {
    Fetching,
    Complete,
    Failed,
}

/// Fetch one page at `offset`.
///
/// Any transport failure or non-success status is reported as
/// `Error::SourceUnavailable`.
pub async fn fetch_page(
    source: &dyn RecordSource, columns: &[Column], filters: &NormalizedFilters, record_type: &str, offset: u32,
) -> Result<Vec<Value>, Error> {
    let request = SourceRequest::page(columns, filters, record_type, offset);
    let result = source.fetch_page(&request).await?;

    if !result.is_success() {
        tracing::warn!(offset, status = result.status_code, "source returned non-success status");
        return Err(Error::SourceUnavailable(format!("HTTP {}", result.status_code)));
    }

    Ok(result.items)
}

/// Drives pages from offset 0 until the source returns a short page.
///
/// Holds the page cursor and the running count; the running count is the id
/// of the last emitted record and is never reset between pages.
pub struct PaginatedFetcher<'a> {
    source: &'a dyn RecordSource,
    columns: &'a [Column],
    filters: &'a NormalizedFilters,
    record_type: &'a str,
    offset: u32,
    running_count: i64,
    pages: u32,
    state: FetchState,
}

impl<'a> PaginatedFetcher<'a> {
    pub fn new(
        source: &'a dyn RecordSource, columns: &'a [Column], filters: &'a NormalizedFilters, record_type: &'a str,
    ) -> Self {
        Self { source, columns, filters, record_type, offset: 0, running_count: 0, pages: 0, state: FetchState::Fetching }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// Offset of the next (or last attempted) page.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Records emitted so far across all pages.
    pub fn running_count(&self) -> i64 {
        self.running_count
    }

    /// Pages fetched successfully.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Fetch pages until a short page arrives or something fails.
    ///
    /// Each page is fully buffered and flushed before the next request. The
    /// budget is checked between pages and bounds every outstanding request.
    pub async fn run(
        &mut self, template: &RecordTemplate, writer: &mut CacheWriter<'_>, budget: &ExecutionBudget,
    ) -> Result<(), Error> {
        while self.state == FetchState::Fetching {
            match self.next_page(template, writer, budget).await {
                Ok(true) => self.offset += 1,
                Ok(false) => self.state = FetchState::Complete,
                Err(err) => {
                    self.state = FetchState::Failed;
                    tracing::warn!(
                        hash = template.hash(),
                        offset = self.offset,
                        records = self.running_count,
                        error = %err,
                        "ingest run failed"
                    );
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Process the page at the current offset. Returns true if another page may follow.
    async fn next_page(
        &mut self, template: &RecordTemplate, writer: &mut CacheWriter<'_>, budget: &ExecutionBudget,
    ) -> Result<bool, Error> {
        budget.check()?;

        let items = budget
            .bound(fetch_page(self.source, self.columns, self.filters, self.record_type, self.offset))
            .await??;
        self.pages += 1;

        for item in &items {
            self.running_count += 1;
            writer.push(template.record(self.running_count, item)?).await?;
        }
        writer.flush().await?;

        tracing::info!(
            hash = template.hash(),
            offset = self.offset,
            items = items.len(),
            records = self.running_count,
            "ingested source page"
        );

        Ok(items.len() == PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::test_support::ScriptedSource;
    use crate::source::{FetchResult, SourceError};
    use qcache_core::{CacheDb, QueryDefinition, QueryRequest};
    use std::time::Duration;

    fn query() -> QueryDefinition {
        let request: QueryRequest = serde_json::from_value(serde_json::json!({
            "columns": [{"name": "id"}],
            "format": {"type": "item"},
        }))
        .unwrap();
        request.validate().unwrap()
    }

    fn template(query: &QueryDefinition) -> RecordTemplate {
        RecordTemplate::new(&query.hash(), query, &query.normalized_filters(), "2024-05-01 12:00:00").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_page_sends_offset_and_returns_items() {
        let source = ScriptedSource::with_page_sizes(&[3]);
        let query = query();
        let filters = query.normalized_filters();

        let items = fetch_page(&source, &query.columns, &filters, "item", 4).await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(source.offsets(), vec![4]);
    }

    #[tokio::test]
    async fn test_fetch_page_non_success_status() {
        let source = ScriptedSource::new(vec![Ok(FetchResult::status(502))]);
        let query = query();
        let filters = query.normalized_filters();

        let err = fetch_page(&source, &query.columns, &filters, "item", 0).await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(msg) if msg.contains("502")));
    }

    #[tokio::test]
    async fn test_fetch_page_transport_error() {
        let source = ScriptedSource::new(vec![Err(SourceError::Timeout)]);
        let query = query();
        let filters = query.normalized_filters();

        let err = fetch_page(&source, &query.columns, &filters, "item", 0).await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_short_page_completes() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let source = ScriptedSource::with_page_sizes(&[PAGE_SIZE - 1]);
        let query = query();
        let filters = query.normalized_filters();
        let template = template(&query);
        let mut writer = CacheWriter::new(&db);
        let budget = ExecutionBudget::start(Duration::from_secs(300));

        let mut fetcher = PaginatedFetcher::new(&source, &query.columns, &filters, "item");
        assert_eq!(fetcher.state(), FetchState::Fetching);
        fetcher.run(&template, &mut writer, &budget).await.unwrap();

        assert_eq!(fetcher.state(), FetchState::Complete);
        assert_eq!(fetcher.pages(), 1);
        assert_eq!(fetcher.running_count(), (PAGE_SIZE - 1) as i64);
        assert_eq!(source.offsets(), vec![0]);
    }

    #[tokio::test]
    async fn test_full_page_then_empty_page() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let source = ScriptedSource::with_page_sizes(&[PAGE_SIZE, 0]);
        let query = query();
        let filters = query.normalized_filters();
        let template = template(&query);
        let mut writer = CacheWriter::new(&db);
        let budget = ExecutionBudget::start(Duration::from_secs(300));

        let mut fetcher = PaginatedFetcher::new(&source, &query.columns, &filters, "item");
        fetcher.run(&template, &mut writer, &budget).await.unwrap();

        assert_eq!(fetcher.state(), FetchState::Complete);
        assert_eq!(source.offsets(), vec![0, 1]);
        assert_eq!(fetcher.offset(), 1);
        assert_eq!(fetcher.running_count(), PAGE_SIZE as i64);
        assert_eq!(writer.written(), PAGE_SIZE);
        assert_eq!(writer.buffered(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_terminal() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let source = ScriptedSource::new(vec![Ok(FetchResult::status(500))]);
        let query = query();
        let filters = query.normalized_filters();
        let template = template(&query);
        let mut writer = CacheWriter::new(&db);
        let budget = ExecutionBudget::start(Duration::from_secs(300));

        let mut fetcher = PaginatedFetcher::new(&source, &query.columns, &filters, "item");
        assert!(fetcher.run(&template, &mut writer, &budget).await.is_err());
        assert_eq!(fetcher.state(), FetchState::Failed);
        assert_eq!(fetcher.pages(), 0);
        assert_eq!(fetcher.running_count(), 0);
        assert_eq!(source.offsets(), vec![0]);
    }
}
