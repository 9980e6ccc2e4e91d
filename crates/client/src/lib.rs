//! Client code for qcache.
//!
//! This crate provides the external record source client and the ingest
//! pipeline that pages through it into the cache.

pub mod ingest;
pub mod source;

pub use ingest::{CacheWriter, CompletionHandler, ExecutionBudget, FetchState, Ingestor, PaginatedFetcher, RunSummary};
pub use source::{FetchResult, PAGE_SIZE, RecordSource, SourceClient, SourceConfig, SourceError, SourceRequest};
