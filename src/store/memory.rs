// src/store/memory.rs
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::RankingStore;
use crate::error::StoreError;
use crate::types::RankingRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Read,
    Delete,
    Insert,
}

/// Process-local table with call counters and per-operation failure injection.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    rows: Mutex<Vec<RankingRecord>>,
    reads: AtomicUsize,
    deletes: AtomicUsize,
    inserts: AtomicUsize,
    fail_read: AtomicBool,
    fail_delete: AtomicBool,
    fail_insert: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<RankingRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    fn table(&self) -> MutexGuard<'_, Vec<RankingRecord>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn rows(&self) -> Vec<RankingRecord> {
        self.table().clone()
    }

    pub fn read_calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    /// Make every subsequent call of `op` fail (or succeed again).
    pub fn set_failing(&self, op: StoreOp, failing: bool) {
        let flag = match op {
            StoreOp::Read => &self.fail_read,
            StoreOp::Delete => &self.fail_delete,
            StoreOp::Insert => &self.fail_insert,
        };
        flag.store(failing, Ordering::SeqCst);
    }

    fn injected(flag: &AtomicBool, what: &str) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Api {
                status: 503,
                message: format!("injected {what} failure"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RankingStore for InMemoryStore {
    async fn first_event_id(&self) -> Result<Option<String>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Self::injected(&self.fail_read, "read")?;
        Ok(self.table().first().map(|r| r.event_id.clone()))
    }

    async fn delete_other_events(&self, keep_event_id: &str) -> Result<(), StoreError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Self::injected(&self.fail_delete, "delete")?;
        self.table().retain(|r| r.event_id == keep_event_id);
        Ok(())
    }

    async fn insert_many(&self, rows: &[RankingRecord]) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Self::injected(&self.fail_insert, "insert")?;
        self.table().extend_from_slice(rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RankEntry;
    use chrono::Utc;

    fn row(event: &str, rank: u32) -> RankingRecord {
        RankingRecord::stamp(RankEntry { rank, score: 1 }, event, Utc::now())
    }

    #[tokio::test]
    async fn delete_keeps_only_the_given_event() {
        let store = InMemoryStore::with_rows(vec![row("A", 1), row("B", 2), row("A", 3)]);
        store.delete_other_events("B").await.unwrap();
        let left = store.rows();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].event_id, "B");
        assert_eq!(store.delete_calls(), 1);
    }

    #[tokio::test]
    async fn injected_insert_failure_leaves_table_untouched() {
        let store = InMemoryStore::new();
        store.set_failing(StoreOp::Insert, true);
        assert!(store.insert_many(&[row("A", 1)]).await.is_err());
        assert!(store.rows().is_empty());
        assert_eq!(store.insert_calls(), 1);
    }

    #[tokio::test]
    async fn first_event_id_on_empty_table_is_none() {
        let store = InMemoryStore::new();
        assert_eq!(store.first_event_id().await.unwrap(), None);
    }
}
