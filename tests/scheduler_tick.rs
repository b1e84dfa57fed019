// tests/scheduler_tick.rs
use std::sync::Arc;
use std::time::Duration;

use event_ranking_collector::clock::SystemClock;
use event_ranking_collector::fetch::StaticFeed;
use event_ranking_collector::scheduler::{spawn_scheduler, SchedulerCfg};
use event_ranking_collector::select::RankSelection;
use event_ranking_collector::store::InMemoryStore;
use event_ranking_collector::CollectionPipeline;

#[tokio::test]
async fn first_tick_runs_immediately() {
    let store = Arc::new(InMemoryStore::new());
    let pipeline = CollectionPipeline::new(
        Arc::new(StaticFeed::new(
            include_str!("fixtures/top100.json"),
            include_str!("fixtures/border.json"),
        )),
        store.clone(),
        Arc::new(SystemClock),
        RankSelection::default(),
    );

    let handle = spawn_scheduler(Arc::new(pipeline), SchedulerCfg { interval_secs: 3600 });

    let mut waited = 0;
    while store.insert_calls() == 0 && waited < 50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += 1;
    }
    handle.abort();

    assert_eq!(store.insert_calls(), 1);
    assert_eq!(store.rows().len(), 2);
}
