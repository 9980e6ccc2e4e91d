//! Buffered, batched persistence of cache records.

use qcache_core::{CacheDb, CacheRecord, Error};

/// Records buffered before a batch upsert is issued.
pub const BATCH_SIZE: usize = 1000;

/// Buffers records and upserts them in batches of at most [`BATCH_SIZE`].
///
/// Records are written in push order; empty flushes issue no store call.
#[derive(Debug)]
pub struct CacheWriter<'a> {
    db: &'a CacheDb,
    buffer: Vec<CacheRecord>,
    batches: usize,
    written: usize,
}

impl<'a> CacheWriter<'a> {
    pub fn new(db: &'a CacheDb) -> Self {
        Self { db, buffer: Vec::with_capacity(BATCH_SIZE), batches: 0, written: 0 }
    }

    /// Buffer a record, upserting the buffer once it holds a full batch.
    pub async fn push(&mut self, record: CacheRecord) -> Result<(), Error> {
        self.buffer.push(record);
        if self.buffer.len() >= BATCH_SIZE {
            self.flush().await?;
        }
        Ok(())
    }

    /// Upsert whatever is buffered. Returns the number of records written.
    pub async fn flush(&mut self) -> Result<usize, Error> {
        if self.buffer.is_empty() {
            return Ok(0);
        }
        let batch = std::mem::replace(&mut self.buffer, Vec::with_capacity(BATCH_SIZE));
        let first_id = batch.first().map(|r| r.id);
        let written = self.db.upsert_records(batch).await?;
        self.batches += 1;
        self.written += written;
        tracing::debug!(batch = self.batches, records = written, first_id, "flushed cache batch");
        Ok(written)
    }

    /// Records waiting for the next flush.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Batch upserts issued so far.
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Records persisted so far.
    pub fn written(&self) -> usize {
        self.written
    }
}
