use super::models::{QueueCounts, QueueItem, QueueStatus};
use super::schema::WORK_QUEUE_VERSIONED_SCHEMAS;
use crate::sqlite_persistence::open_database;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Storage for queued cancellation work.
///
/// State transitions are atomic: claiming moves exactly one PENDING item to
/// IN_PROGRESS, so a single worker never processes an item twice and the
/// sweep can safely run while the worker drains.
pub trait WorkQueueStore: Send + Sync {
    fn enqueue(&self, item: QueueItem) -> Result<()>;
    fn get_item(&self, id: &str) -> Result<Option<QueueItem>>;
    /// Claim the oldest pending item (PENDING → IN_PROGRESS, attempts + 1).
    fn claim_next(&self) -> Result<Option<QueueItem>>;
    fn mark_completed(&self, id: &str) -> Result<()>;
    /// Put a failed attempt back in PENDING for a later retry.
    fn mark_retry(&self, id: &str, error: &str) -> Result<()>;
    fn mark_failed(&self, id: &str, error: &str) -> Result<()>;
    fn counts(&self) -> Result<QueueCounts>;
    fn list(&self, status: Option<QueueStatus>, limit: usize, offset: usize)
        -> Result<Vec<QueueItem>>;
    /// Whether a registration already has an item in a non-terminal state.
    fn is_actively_queued(&self, registration_id: &str) -> Result<bool>;
    /// Put items stuck in IN_PROGRESS for longer than `stuck_for_secs` back
    /// in PENDING. Recovers work orphaned by a crash mid-apply.
    fn requeue_stale(&self, stuck_for_secs: i64) -> Result<usize>;
}

pub struct SqliteWorkQueueStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteWorkQueueStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_database(db_path, &WORK_QUEUE_VERSIONED_SCHEMAS)
            .context("Failed to open work queue database")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<QueueItem> {
        let status_str: String = row.get("status")?;
        let attempts: i64 = row.get("attempts")?;
        Ok(QueueItem {
            id: row.get("id")?,
            registration_id: row.get("registration_id")?,
            status: QueueStatus::parse(&status_str).unwrap_or(QueueStatus::Failed),
            attempts: attempts as u32,
            last_error: row.get("last_error")?,
            enqueued_at: row.get("enqueued_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn set_status(&self, id: &str, status: QueueStatus, error: Option<&str>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE work_queue SET status = ?1, last_error = ?2, updated_at = ?3 WHERE id = ?4",
            params![status.as_str(), error, Utc::now().timestamp(), id],
        )?;
        Ok(())
    }
}

impl WorkQueueStore for SqliteWorkQueueStore {
    fn enqueue(&self, item: QueueItem) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO work_queue (id, registration_id, status, attempts, last_error, enqueued_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                item.id,
                item.registration_id,
                item.status.as_str(),
                item.attempts,
                item.last_error,
                item.enqueued_at,
                item.updated_at,
            ],
        )
        .context("Failed to enqueue work item")?;
        Ok(())
    }

    fn get_item(&self, id: &str) -> Result<Option<QueueItem>> {
        let conn = self.conn.lock().unwrap();
        let item = conn
            .query_row(
                "SELECT * FROM work_queue WHERE id = ?1",
                params![id],
                Self::row_to_item,
            )
            .optional()?;
        Ok(item)
    }

    fn claim_next(&self) -> Result<Option<QueueItem>> {
        let mut guard = self.conn.lock().unwrap();
        let tx = guard.transaction()?;
        let claimed = {
            let next_id: Option<String> = tx
                .query_row(
                    "SELECT id FROM work_queue WHERE status = ?1 ORDER BY enqueued_at, id LIMIT 1",
                    params![QueueStatus::Pending.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            match next_id {
                Some(id) => {
                    tx.execute(
                        "UPDATE work_queue
                         SET status = ?1, attempts = attempts + 1, updated_at = ?2
                         WHERE id = ?3 AND status = ?4",
                        params![
                            QueueStatus::InProgress.as_str(),
                            Utc::now().timestamp(),
                            id,
                            QueueStatus::Pending.as_str()
                        ],
                    )?;
                    tx.query_row(
                        "SELECT * FROM work_queue WHERE id = ?1",
                        params![id],
                        Self::row_to_item,
                    )
                    .optional()?
                }
                None => None,
            }
        };
        tx.commit()?;
        Ok(claimed)
    }

    fn mark_completed(&self, id: &str) -> Result<()> {
        self.set_status(id, QueueStatus::Completed, None)
    }

    fn mark_retry(&self, id: &str, error: &str) -> Result<()> {
        self.set_status(id, QueueStatus::Pending, Some(error))
    }

    fn mark_failed(&self, id: &str, error: &str) -> Result<()> {
        self.set_status(id, QueueStatus::Failed, Some(error))
    }

    fn counts(&self) -> Result<QueueCounts> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT status, COUNT(*) FROM work_queue GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut counts = QueueCounts::default();
        for row in rows {
            let (status, count) = row?;
            let count = count as usize;
            match QueueStatus::parse(&status) {
                Some(QueueStatus::Pending) => counts.pending = count,
                Some(QueueStatus::InProgress) => counts.in_progress = count,
                Some(QueueStatus::Completed) => counts.completed = count,
                Some(QueueStatus::Failed) | None => counts.failed += count,
            }
        }
        Ok(counts)
    }

    fn list(
        &self,
        status: Option<QueueStatus>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<QueueItem>> {
        let conn = self.conn.lock().unwrap();
        let items = match status {
            Some(status) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM work_queue WHERE status = ?1
                     ORDER BY enqueued_at DESC, id LIMIT ?2 OFFSET ?3",
                )?;
                let rows =
                    stmt.query_map(params![status.as_str(), limit, offset], Self::row_to_item)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM work_queue ORDER BY enqueued_at DESC, id LIMIT ?1 OFFSET ?2",
                )?;
                let rows = stmt.query_map(params![limit, offset], Self::row_to_item)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(items)
    }

    fn is_actively_queued(&self, registration_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM work_queue WHERE registration_id = ?1 AND status IN (?2, ?3)",
            params![
                registration_id,
                QueueStatus::Pending.as_str(),
                QueueStatus::InProgress.as_str()
            ],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn requeue_stale(&self, stuck_for_secs: i64) -> Result<usize> {
        let now = Utc::now().timestamp();
        let conn = self.conn.lock().unwrap();
        let requeued = conn.execute(
            "UPDATE work_queue
             SET status = ?1, last_error = ?2, updated_at = ?3
             WHERE status = ?4 AND updated_at <= ?5",
            params![
                QueueStatus::Pending.as_str(),
                "requeued after stale in-progress state",
                now,
                QueueStatus::InProgress.as_str(),
                now - stuck_for_secs,
            ],
        )?;
        Ok(requeued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_store() -> (SqliteWorkQueueStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteWorkQueueStore::new(dir.path().join("queue.db")).unwrap();
        (store, dir)
    }

    #[test]
    fn enqueue_and_claim_oldest_first() {
        let (store, _dir) = new_store();
        let mut first = QueueItem::cancellation("reg-1");
        first.enqueued_at = 100;
        let mut second = QueueItem::cancellation("reg-2");
        second.enqueued_at = 200;
        store.enqueue(second).unwrap();
        store.enqueue(first.clone()).unwrap();

        let claimed = store.claim_next().unwrap().unwrap();
        assert_eq!(claimed.id, first.id);
        assert_eq!(claimed.status, QueueStatus::InProgress);
        assert_eq!(claimed.attempts, 1);
    }

    #[test]
    fn claim_on_empty_queue_returns_none() {
        let (store, _dir) = new_store();
        assert!(store.claim_next().unwrap().is_none());
    }

    #[test]
    fn claimed_items_are_not_claimed_again() {
        let (store, _dir) = new_store();
        store.enqueue(QueueItem::cancellation("reg-1")).unwrap();
        assert!(store.claim_next().unwrap().is_some());
        assert!(store.claim_next().unwrap().is_none());
    }

    #[test]
    fn retry_puts_item_back_in_pending() {
        let (store, _dir) = new_store();
        store.enqueue(QueueItem::cancellation("reg-1")).unwrap();
        let claimed = store.claim_next().unwrap().unwrap();

        store.mark_retry(&claimed.id, "store unavailable").unwrap();
        let item = store.get_item(&claimed.id).unwrap().unwrap();
        assert_eq!(item.status, QueueStatus::Pending);
        assert_eq!(item.last_error.as_deref(), Some("store unavailable"));

        // Second claim increments the attempt counter.
        let reclaimed = store.claim_next().unwrap().unwrap();
        assert_eq!(reclaimed.attempts, 2);
    }

    #[test]
    fn terminal_transitions() {
        let (store, _dir) = new_store();
        store.enqueue(QueueItem::cancellation("reg-1")).unwrap();
        store.enqueue(QueueItem::cancellation("reg-2")).unwrap();

        let first = store.claim_next().unwrap().unwrap();
        store.mark_completed(&first.id).unwrap();
        let second = store.claim_next().unwrap().unwrap();
        store.mark_failed(&second.id, "no such registration").unwrap();

        assert_eq!(
            store.get_item(&first.id).unwrap().unwrap().status,
            QueueStatus::Completed
        );
        let failed = store.get_item(&second.id).unwrap().unwrap();
        assert_eq!(failed.status, QueueStatus::Failed);
        assert_eq!(failed.last_error.as_deref(), Some("no such registration"));
    }

    #[test]
    fn counts_by_status() {
        let (store, _dir) = new_store();
        store.enqueue(QueueItem::cancellation("reg-1")).unwrap();
        store.enqueue(QueueItem::cancellation("reg-2")).unwrap();
        store.enqueue(QueueItem::cancellation("reg-3")).unwrap();
        let claimed = store.claim_next().unwrap().unwrap();
        store.mark_completed(&claimed.id).unwrap();

        let counts = store.counts().unwrap();
        assert_eq!(
            counts,
            QueueCounts {
                pending: 2,
                in_progress: 0,
                completed: 1,
                failed: 0
            }
        );
    }

    #[test]
    fn list_filters_by_status() {
        let (store, _dir) = new_store();
        store.enqueue(QueueItem::cancellation("reg-1")).unwrap();
        store.enqueue(QueueItem::cancellation("reg-2")).unwrap();
        let claimed = store.claim_next().unwrap().unwrap();
        store.mark_completed(&claimed.id).unwrap();

        let pending = store.list(Some(QueueStatus::Pending), 10, 0).unwrap();
        assert_eq!(pending.len(), 1);
        let all = store.list(None, 10, 0).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn stale_in_progress_items_are_requeued() {
        let (store, _dir) = new_store();
        store.enqueue(QueueItem::cancellation("reg-1")).unwrap();
        let claimed = store.claim_next().unwrap().unwrap();

        // Not stale yet.
        assert_eq!(store.requeue_stale(3600).unwrap(), 0);

        // A zero cutoff makes the just-claimed item stale.
        assert_eq!(store.requeue_stale(0).unwrap(), 1);
        let item = store.get_item(&claimed.id).unwrap().unwrap();
        assert_eq!(item.status, QueueStatus::Pending);
        assert!(item.last_error.unwrap().contains("requeued"));
    }

    #[test]
    fn active_queue_membership() {
        let (store, _dir) = new_store();
        assert!(!store.is_actively_queued("reg-1").unwrap());

        store.enqueue(QueueItem::cancellation("reg-1")).unwrap();
        assert!(store.is_actively_queued("reg-1").unwrap());

        let claimed = store.claim_next().unwrap().unwrap();
        assert!(store.is_actively_queued("reg-1").unwrap());

        store.mark_completed(&claimed.id).unwrap();
        assert!(!store.is_actively_queued("reg-1").unwrap());
    }
}
