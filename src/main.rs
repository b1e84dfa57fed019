//! Event ranking collector — binary entrypoint.
//! Loads config, wires the pipeline and runs it once, or on an interval when
//! one is configured.

use std::sync::Arc;

use anyhow::Context;
use event_ranking_collector::config::CollectorConfig;
use event_ranking_collector::scheduler::{spawn_scheduler, SchedulerCfg};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `LOG_FORMAT=json` for structured output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("event_ranking_collector=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = CollectorConfig::load_default().context("loading collector config")?;
    tracing::info!(
        top_url = %cfg.top_url,
        border_url = %cfg.border_url,
        table = %cfg.store.table,
        key_len = cfg.store.api_key.len(),
        "collector config loaded"
    );

    let pipeline = event_ranking_collector::build_pipeline(&cfg)?;

    match cfg.interval_secs {
        Some(interval_secs) => {
            let handle = spawn_scheduler(Arc::new(pipeline), SchedulerCfg { interval_secs });
            tokio::select! {
                res = handle => res.context("scheduler task stopped")?,
                _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
            }
            Ok(())
        }
        None => {
            // The failure is logged inside `run`; exit non-zero so cron notices.
            pipeline.run().await?;
            Ok(())
        }
    }
}
