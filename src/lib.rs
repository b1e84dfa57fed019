// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod guard;
pub mod pipeline;
pub mod scheduler;
pub mod select;
pub mod store;
pub mod types;
pub mod writer;

// ---- Re-exports for stable public API ----
pub use crate::error::{FetchError, GuardError, PipelineError, StoreError, WriteError};
pub use crate::pipeline::{CollectionPipeline, RunStage, RunSummary};
pub use crate::types::{RankEntry, RankingRecord, UNKNOWN_EVENT};

use std::sync::Arc;

use anyhow::Context;

use crate::clock::SystemClock;
use crate::config::CollectorConfig;
use crate::fetch::HttpRankingFeed;
use crate::store::PostgrestStore;

/// Wire the production pipeline (HTTP feeds + PostgREST store + system clock).
pub fn build_pipeline(cfg: &CollectorConfig) -> anyhow::Result<CollectionPipeline> {
    let client = reqwest::Client::builder()
        .build()
        .context("building HTTP client")?;

    let mut feed = HttpRankingFeed::new(client.clone(), &cfg.top_url, &cfg.border_url);
    let mut store = PostgrestStore::new(
        client,
        &cfg.store.url,
        cfg.store.api_key.clone(),
        cfg.store.table.clone(),
    );
    if let Some(secs) = cfg.request_timeout_secs {
        feed = feed.with_timeout(secs);
        store = store.with_timeout(secs);
    }

    Ok(CollectionPipeline::new(
        Arc::new(feed),
        Arc::new(store),
        Arc::new(SystemClock),
        cfg.selection(),
    ))
}
