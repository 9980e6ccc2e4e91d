//! SQLite-backed cache for ingested query results.
//!
//! This module provides a persistent, content-addressed cache using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Query hashes derived from ordered columns and filters
//! - Batched upserts keyed by `(hash, id)`
//! - A cleanup task queue for downstream expiry
//! - Automatic schema migrations and WAL mode
//! - An in-memory claim table for in-flight runs

pub mod cleanup;
pub mod connection;
pub mod hash;
pub mod in_flight;
pub mod migrations;
pub mod records;

pub use crate::Error;

pub use cleanup::{CleanupTask, QueuedCleanupTask};
pub use connection::CacheDb;
pub use hash::{compute_query_hash, is_query_hash};
pub use in_flight::InFlightCache;
pub use records::CacheRecord;
