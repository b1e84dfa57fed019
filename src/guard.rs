// src/guard.rs
//! Event rollover detection.
//!
//! The live API never says an event ended; the only signal is a different `id`
//! on the top feed. Before any row of a new event is written, rows of every
//! other event are purged so the table only ever holds one event at rest.

use std::sync::Arc;

use metrics::counter;

use crate::error::GuardError;
use crate::store::RankingStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Table held no rows.
    EmptyStore,
    /// Resident rows already belong to the incoming event.
    SameEvent,
    /// Rows of `previous` were deleted.
    Purged { previous: String },
}

#[derive(Clone)]
pub struct EventTransitionGuard {
    store: Arc<dyn RankingStore>,
}

impl EventTransitionGuard {
    pub fn new(store: Arc<dyn RankingStore>) -> Self {
        Self { store }
    }

    pub async fn ensure_current_event(
        &self,
        new_event_id: &str,
    ) -> Result<GuardOutcome, GuardError> {
        let resident = self
            .store
            .first_event_id()
            .await
            .map_err(GuardError::Read)?;

        let Some(previous) = resident else {
            return Ok(GuardOutcome::EmptyStore);
        };
        if previous == new_event_id {
            tracing::debug!(event_id = new_event_id, "same event, rows accumulate");
            return Ok(GuardOutcome::SameEvent);
        }

        tracing::info!(
            previous = %previous,
            event_id = new_event_id,
            "new event detected, clearing old data"
        );
        // Relative to the incoming id, not "delete all": rows another writer
        // already stored for the new event must survive.
        self.store
            .delete_other_events(new_event_id)
            .await
            .map_err(GuardError::Delete)?;

        counter!("collector_event_rollovers_total").increment(1);
        tracing::info!(previous = %previous, "old event data cleared");
        Ok(GuardOutcome::Purged { previous })
    }
}
