//! Cached record operations.
//!
//! Rows live in `query_cache`, keyed by `(hash, id)` where `id` is the
//! 1-based position of the item across a whole ingest run.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// One persisted item fetched from the record source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheRecord {
    pub id: i64,
    pub eol: i64,
    /// JSON-serialized column list.
    pub columns: String,
    /// JSON-serialized normalized filters.
    pub filters: String,
    pub results: i64,
    pub page: i64,
    #[serde(rename = "type")]
    pub record_type: String,
    /// JSON-serialized source item.
    pub response: String,
    pub hash: String,
    pub created_at: String,
    pub updated_at: String,
}

impl CacheDb {
    /// Upsert a batch of records in a single transaction.
    ///
    /// New `(hash, id)` keys are inserted. Existing keys only have `response`
    /// and `updated_at` overwritten; every other column keeps its first value.
    /// Returns the number of records written.
    pub async fn upsert_records(&self, records: Vec<CacheRecord>) -> Result<usize, Error> {
        if records.is_empty() {
            return Ok(0);
        }

        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare_cached(
                        "INSERT INTO query_cache (
                            hash, id, eol, columns, filters, results, page, type,
                            response, created_at, updated_at
                        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                        ON CONFLICT(hash, id) DO UPDATE SET
                            response = excluded.response,
                            updated_at = excluded.updated_at",
                    )?;
                    for record in &records {
                        stmt.execute(params![
                            &record.hash,
                            record.id,
                            record.eol,
                            &record.columns,
                            &record.filters,
                            record.results,
                            record.page,
                            &record.record_type,
                            &record.response,
                            &record.created_at,
                            &record.updated_at,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(records.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Fetch one page of records for a hash, ordered by `id`.
    ///
    /// `page` is 1-based.
    pub async fn get_records(&self, hash: &str, page: i64, per_page: i64) -> Result<Vec<CacheRecord>, Error> {
        if page < 1 || per_page < 1 {
            return Err(Error::InvalidInput("page and per_page must be 1 or greater".into()));
        }
        let hash = hash.to_string();
        let offset = (page - 1).saturating_mul(per_page);
        self.conn
            .call(move |conn| -> Result<Vec<CacheRecord>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT id, eol, columns, filters, results, page, type, response, hash, created_at, updated_at
                    FROM query_cache WHERE hash = ?1 ORDER BY id LIMIT ?2 OFFSET ?3",
                )?;
                let rows = stmt.query_map(params![hash, per_page, offset], |row| {
                    Ok(CacheRecord {
                        id: row.get(0)?,
                        eol: row.get(1)?,
                        columns: row.get(2)?,
                        filters: row.get(3)?,
                        results: row.get(4)?,
                        page: row.get(5)?,
                        record_type: row.get(6)?,
                        response: row.get(7)?,
                        hash: row.get(8)?,
                        created_at: row.get(9)?,
                        updated_at: row.get(10)?,
                    })
                })?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Count cached records for a hash.
    pub async fn count_records(&self, hash: &str) -> Result<u64, Error> {
        let hash = hash.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM query_cache WHERE hash = ?1", params![hash], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every record for a hash.
    ///
    /// Returns the number of deleted rows.
    pub async fn delete_records(&self, hash: &str) -> Result<u64, Error> {
        let hash = hash.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM query_cache WHERE hash = ?1", params![hash])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
