//! Cleanup task queue.
//!
//! A completed ingest run enqueues one task naming its run date and hash.
//! Whatever consumes the queue decides which rows to expire.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// A request to expire rows for `hash` relative to `run_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CleanupTask {
    pub run_date: String,
    pub hash: String,
}

/// A queued cleanup task with its queue id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct QueuedCleanupTask {
    pub task_id: i64,
    pub task: CleanupTask,
    pub enqueued_at: String,
}

impl CacheDb {
    /// Append a cleanup task to the queue. Returns the new task id.
    pub async fn enqueue_cleanup(&self, task: &CleanupTask) -> Result<i64, Error> {
        let task = task.clone();
        let enqueued_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<i64, Error> {
                conn.execute(
                    "INSERT INTO cleanup_tasks (run_date, hash, enqueued_at) VALUES (?1, ?2, ?3)",
                    params![task.run_date, task.hash, enqueued_at],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(Error::from)
    }

    /// List tasks not yet marked complete, oldest first.
    pub async fn pending_cleanup_tasks(&self) -> Result<Vec<QueuedCleanupTask>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<QueuedCleanupTask>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT task_id, run_date, hash, enqueued_at FROM cleanup_tasks
                    WHERE completed_at IS NULL ORDER BY task_id",
                )?;
                let rows = stmt.query_map([], |row| {
                    Ok(QueuedCleanupTask {
                        task_id: row.get(0)?,
                        task: CleanupTask { run_date: row.get(1)?, hash: row.get(2)? },
                        enqueued_at: row.get(3)?,
                    })
                })?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Mark a task complete. Returns false if it was unknown or already done.
    pub async fn complete_cleanup_task(&self, task_id: i64) -> Result<bool, Error> {
        let completed_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let changed = conn.execute(
                    "UPDATE cleanup_tasks SET completed_at = ?1 WHERE task_id = ?2 AND completed_at IS NULL",
                    params![completed_at, task_id],
                )?;
                Ok(changed == 1)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(hash: &str) -> CleanupTask {
        CleanupTask { run_date: "2024-05-01 12:00:00".into(), hash: hash.into() }
    }

    #[tokio::test]
    async fn test_enqueue_and_list() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let first = db.enqueue_cleanup(&task("aa")).await.unwrap();
        let second = db.enqueue_cleanup(&task("bb")).await.unwrap();
        assert!(second > first);

        let pending = db.pending_cleanup_tasks().await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].task, task("aa"));
        assert_eq!(pending[1].task.hash, "bb");
    }

    #[tokio::test]
    async fn test_complete_removes_from_pending() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let id = db.enqueue_cleanup(&task("aa")).await.unwrap();

        assert!(db.complete_cleanup_task(id).await.unwrap());
        assert!(!db.complete_cleanup_task(id).await.unwrap());
        assert!(db.pending_cleanup_tasks().await.unwrap().is_empty());
    }
}
