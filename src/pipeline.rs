// src/pipeline.rs
//! One collection cycle: fetch -> guard -> select -> write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use tokio::sync::Mutex;

use crate::clock::Clock;
use crate::error::PipelineError;
use crate::fetch::{RankingFeed, RankingFetcher};
use crate::guard::{EventTransitionGuard, GuardOutcome};
use crate::select::RankSelection;
use crate::store::RankingStore;
use crate::types::{RankingRecord, UNKNOWN_EVENT};
use crate::writer::SnapshotWriter;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("collector_runs_total", "Collection cycles started.");
        describe_counter!(
            "collector_run_failures_total",
            "Collection cycles aborted, labelled by failing stage."
        );
        describe_counter!("collector_rows_written_total", "Ranking rows inserted.");
        describe_counter!(
            "collector_event_rollovers_total",
            "Event id changes that purged the previous event."
        );
        describe_histogram!("collector_fetch_ms", "Time to fetch both feeds in milliseconds.");
        describe_gauge!("collector_last_run_ts", "Unix ts of the last completed cycle.");
    });
}

/// Progress of a single run. Terminal states are `Written` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Start,
    Fetched,
    Guarded,
    Filtered,
    Written,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub event_id: String,
    pub captured_at: DateTime<Utc>,
    pub guard: GuardOutcome,
    pub top_kept: usize,
    pub border_kept: usize,
    pub rows_written: usize,
    pub stage: RunStage,
}

pub struct CollectionPipeline {
    fetcher: RankingFetcher,
    guard: EventTransitionGuard,
    writer: SnapshotWriter,
    selection: RankSelection,
    clock: Arc<dyn Clock>,
    // Serializes guard+write for runs sharing this pipeline. Separate
    // processes must still not overlap.
    run_lock: Mutex<()>,
}

impl CollectionPipeline {
    pub fn new(
        feed: Arc<dyn RankingFeed>,
        store: Arc<dyn RankingStore>,
        clock: Arc<dyn Clock>,
        selection: RankSelection,
    ) -> Self {
        Self {
            fetcher: RankingFetcher::new(feed),
            guard: EventTransitionGuard::new(store.clone()),
            writer: SnapshotWriter::new(store),
            selection,
            clock,
            run_lock: Mutex::new(()),
        }
    }

    /// Run one cycle. Any failure ends the cycle; nothing is retried.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        ensure_metrics_described();
        counter!("collector_runs_total").increment(1);

        let _running = self.run_lock.lock().await;
        let mut stage = RunStage::Start;
        match self.run_stages(&mut stage).await {
            Ok(summary) => {
                gauge!("collector_last_run_ts").set(summary.captured_at.timestamp() as f64);
                tracing::info!(
                    event_id = %summary.event_id,
                    rows = summary.rows_written,
                    top = summary.top_kept,
                    border = summary.border_kept,
                    "collection cycle finished"
                );
                Ok(summary)
            }
            Err(e) => {
                let feed = match &e {
                    PipelineError::Fetch(f) => Some(f.feed().as_str()),
                    _ => None,
                };
                tracing::error!(
                    error = %e,
                    failed_stage = e.stage(),
                    feed = ?feed,
                    reached = ?stage,
                    "collection cycle failed"
                );
                counter!("collector_run_failures_total", "stage" => e.stage()).increment(1);
                Err(e)
            }
        }
    }

    async fn run_stages(&self, stage: &mut RunStage) -> Result<RunSummary, PipelineError> {
        // One timestamp for both feeds, taken before the requests go out.
        let captured_at = self.clock.now();
        tracing::info!(captured_at = %captured_at.to_rfc3339(), "starting collection cycle");

        let fetched = self.fetcher.fetch().await?;
        *stage = RunStage::Fetched;
        if fetched.event_id == UNKNOWN_EVENT {
            tracing::warn!("collecting under the fallback event id");
        }

        let guard = self.guard.ensure_current_event(&fetched.event_id).await?;
        *stage = RunStage::Guarded;

        let top = self.selection.select_top(&fetched.top);
        let border = self.selection.select_border(&fetched.border);
        let records: Vec<RankingRecord> = top
            .iter()
            .chain(border.iter())
            .map(|e| RankingRecord::stamp(*e, &fetched.event_id, captured_at))
            .collect();
        *stage = RunStage::Filtered;

        let rows_written = self.writer.write(&records).await?;
        *stage = RunStage::Written;

        Ok(RunSummary {
            event_id: fetched.event_id,
            captured_at,
            guard,
            top_kept: top.len(),
            border_kept: border.len(),
            rows_written,
            stage: *stage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::fetch::StaticFeed;
    use crate::store::memory::{InMemoryStore, StoreOp};

    const TOP: &str = r#"{"id":"evt42","top_100_player_rankings":[{"rank":1,"score":500000},{"rank":11,"score":10000}]}"#;
    const BORDER: &str = r#"{"border_player_rankings":[{"rank":200,"score":9000},{"rank":999,"score":100}]}"#;

    fn pipeline(feed: StaticFeed, store: Arc<InMemoryStore>) -> CollectionPipeline {
        CollectionPipeline::new(
            Arc::new(feed),
            store,
            Arc::new(FixedClock(Utc::now())),
            RankSelection::default(),
        )
    }

    #[tokio::test]
    async fn write_failure_reports_write_stage() {
        let store = Arc::new(InMemoryStore::new());
        store.set_failing(StoreOp::Insert, true);
        let err = pipeline(StaticFeed::new(TOP, BORDER), store.clone())
            .run()
            .await
            .unwrap_err();
        assert_eq!(err.stage(), "write");
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn summary_counts_each_tier() {
        let store = Arc::new(InMemoryStore::new());
        let s = pipeline(StaticFeed::new(TOP, BORDER), store).run().await.unwrap();
        assert_eq!((s.top_kept, s.border_kept, s.rows_written), (1, 1, 2));
        assert_eq!(s.stage, RunStage::Written);
        assert_eq!(s.guard, GuardOutcome::EmptyStore);
    }
}
