// src/store/mod.rs
pub mod memory;
pub mod postgrest;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::RankingRecord;

pub use memory::InMemoryStore;
pub use postgrest::PostgrestStore;

/// Row store holding the `event_rankings` table.
///
/// `insert_many` must be atomic: either every row lands or none does.
#[async_trait]
pub trait RankingStore: Send + Sync {
    /// Event id of one arbitrary resident row, `None` when the table is empty.
    async fn first_event_id(&self) -> Result<Option<String>, StoreError>;

    /// Delete every row whose event id differs from `keep_event_id`.
    async fn delete_other_events(&self, keep_event_id: &str) -> Result<(), StoreError>;

    async fn insert_many(&self, rows: &[RankingRecord]) -> Result<(), StoreError>;
}
