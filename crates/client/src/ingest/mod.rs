//! Fetch → hash → paginate → batch-cache pipeline.
//!
//! ### Run lifecycle
//!
//! 1. Derive the query hash and normalize filters once.
//! 2. Page through the source from offset 0. Every item becomes a
//!    [`CacheRecord`](qcache_core::CacheRecord) whose id is its 1-based
//!    position across the whole run.
//! 3. Records are upserted in batches of at most [`BATCH_SIZE`].
//! 4. A page with fewer than [`PAGE_SIZE`](crate::source::PAGE_SIZE) items ends
//!    the run; the completion handler then queues cleanup and evicts the
//!    in-flight claim.
//!
//! Any source failure or budget exhaustion aborts the run. Rows written by
//! earlier pages stay; no cleanup is queued and the claim is left to expire.

pub mod budget;
pub mod completion;
pub mod fetcher;
pub mod record;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use budget::{DEFAULT_RUN_BUDGET, ExecutionBudget};
pub use completion::CompletionHandler;
pub use fetcher::{FetchState, PaginatedFetcher, fetch_page};
pub use record::RecordTemplate;
pub use writer::{BATCH_SIZE, CacheWriter};

use std::time::Duration;

use qcache_core::{CacheDb, Error, InFlightCache, QueryDefinition};
use serde::Serialize;

use crate::source::RecordSource;

/// Timestamp format stamped on rows and cleanup tasks.
pub const RUN_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub hash: String,
    pub run_date: String,
    pub state: FetchState,
    pub pages: u32,
    pub records: i64,
    pub batches: usize,
    pub cleanup_task_id: i64,
}

/// Runs ingests against one source, cache and in-flight table.
pub struct Ingestor<'a> {
    source: &'a dyn RecordSource,
    db: &'a CacheDb,
    in_flight: &'a InFlightCache,
    budget: Duration,
}

impl<'a> Ingestor<'a> {
    pub fn new(source: &'a dyn RecordSource, db: &'a CacheDb, in_flight: &'a InFlightCache) -> Self {
        Self { source, db, in_flight, budget: DEFAULT_RUN_BUDGET }
    }

    /// Override the whole-run execution budget.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Ingest every page of `query` into the cache.
    ///
    /// # Errors
    ///
    /// Returns `Error::SourceUnavailable` or `Error::BudgetExceeded` when the
    /// run aborts, and storage errors from the cache.
    pub async fn run(&self, query: &QueryDefinition) -> Result<RunSummary, Error> {
        let hash = query.hash();
        let filters = query.normalized_filters();
        let run_date = chrono::Utc::now().format(RUN_DATE_FORMAT).to_string();
        let template = RecordTemplate::new(&hash, query, &filters, &run_date)?;

        let budget = ExecutionBudget::start(self.budget);
        let mut writer = CacheWriter::new(self.db);
        let mut fetcher = PaginatedFetcher::new(self.source, &query.columns, &filters, &query.format.record_type);

        tracing::info!(
            hash = %hash,
            record_type = %query.format.record_type,
            budget_secs = budget.limit().as_secs(),
            "starting ingest run"
        );

        let outcome = fetcher.run(&template, &mut writer, &budget).await;
        let flushed = writer.flush().await;

        if let Err(err) = outcome {
            if let Err(flush_err) = flushed {
                tracing::warn!(hash = %hash, error = %flush_err, "final flush after failed run also failed");
            }
            return Err(err);
        }
        flushed?;

        let cleanup_task_id = CompletionHandler::new(self.db, self.in_flight)
            .on_complete(&run_date, &hash)
            .await?;

        tracing::info!(
            hash = %hash,
            pages = fetcher.pages(),
            last_offset = fetcher.offset(),
            records = fetcher.running_count(),
            batches = writer.batches(),
            elapsed_ms = budget.elapsed().as_millis() as u64,
            "ingest run complete"
        );

        Ok(RunSummary {
            hash,
            run_date,
            state: fetcher.state(),
            pages: fetcher.pages(),
            records: fetcher.running_count(),
            batches: writer.batches(),
            cleanup_task_id,
        })
    }
}
