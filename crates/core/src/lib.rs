//! Core types and shared functionality for qcache.
//!
//! This crate provides:
//! - Query model, validation and filter normalization
//! - Cache implementation with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod query;

pub use cache::{CacheDb, CacheRecord, CleanupTask, InFlightCache};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use query::{Column, Filter, Format, QueryDefinition, QueryRequest};
