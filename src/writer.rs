// src/writer.rs
use std::sync::Arc;

use metrics::counter;

use crate::error::WriteError;
use crate::store::RankingStore;
use crate::types::RankingRecord;

#[derive(Clone)]
pub struct SnapshotWriter {
    store: Arc<dyn RankingStore>,
}

impl SnapshotWriter {
    pub fn new(store: Arc<dyn RankingStore>) -> Self {
        Self { store }
    }

    /// One bulk insert of the whole snapshot. An empty snapshot is not an
    /// error and issues no store call. Returns the number of rows written.
    pub async fn write(&self, records: &[RankingRecord]) -> Result<usize, WriteError> {
        if records.is_empty() {
            tracing::info!("no ranks matched, nothing to store");
            return Ok(0);
        }
        self.store.insert_many(records).await?;
        counter!("collector_rows_written_total").increment(records.len() as u64);
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::types::RankEntry;
    use chrono::Utc;

    #[tokio::test]
    async fn empty_snapshot_skips_the_store() {
        let store = Arc::new(InMemoryStore::new());
        let n = SnapshotWriter::new(store.clone()).write(&[]).await.unwrap();
        assert_eq!(n, 0);
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn writes_all_rows_in_one_insert() {
        let store = Arc::new(InMemoryStore::new());
        let at = Utc::now();
        let rows = vec![
            RankingRecord::stamp(RankEntry { rank: 1, score: 3 }, "e", at),
            RankingRecord::stamp(RankEntry { rank: 200, score: 2 }, "e", at),
        ];
        let n = SnapshotWriter::new(store.clone()).write(&rows).await.unwrap();
        assert_eq!(n, 2);
        assert_eq!(store.insert_calls(), 1);
        assert_eq!(store.rows(), rows);
    }
}
