//! Run completion: schedule cleanup and release the in-flight claim.

use qcache_core::{CacheDb, CleanupTask, Error, InFlightCache};

/// Fires once per successful run; never on failure.
pub struct CompletionHandler<'a> {
    db: &'a CacheDb,
    in_flight: &'a InFlightCache,
}

impl<'a> CompletionHandler<'a> {
    pub fn new(db: &'a CacheDb, in_flight: &'a InFlightCache) -> Self {
        Self { db, in_flight }
    }

    /// Enqueue the cleanup task for `hash` and evict its in-flight claim.
    ///
    /// Returns the cleanup task id.
    pub async fn on_complete(&self, run_date: &str, hash: &str) -> Result<i64, Error> {
        let task = CleanupTask { run_date: run_date.to_string(), hash: hash.to_string() };
        let task_id = self.db.enqueue_cleanup(&task).await?;
        let evicted = self.in_flight.evict(hash).await;
        tracing::info!(hash, task_id, evicted, "scheduled cache cleanup");
        Ok(task_id)
    }
}
