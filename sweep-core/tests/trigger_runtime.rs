use std::sync::Arc;
use std::time::Duration;

use sweep_core::infrastructure::{InMemoryContentSource, InMemoryProgressStore};
use sweep_core::ports::{ScanTrigger, TriggerJob};
use sweep_core::runtime::{TokioTrigger, TriggerDispatcher, register_daily_scan};
use sweep_core::scan::{Continuation, CoordinatorConfig, ScanCoordinator};
use sweep_model::{ContentType, ItemStatus, ScanId, ScanSnapshot};

fn ct(name: &str) -> ContentType {
    ContentType::parse(name).unwrap()
}

async fn wait_until_completed(coordinator: &ScanCoordinator) -> ScanSnapshot {
    for _ in 0..100 {
        let snapshot = coordinator.status().await.unwrap();
        if snapshot.progress().is_some_and(|p| p.is_completed()) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("scan did not complete");
}

#[tokio::test(start_paused = true)]
async fn timer_trigger_drives_scan_to_completion() {
    let content = InMemoryContentSource::with_default_types().await;
    content
        .insert_many(&ct("post"), ItemStatus::Publish, 9)
        .await;
    let (trigger, receiver) = TokioTrigger::new();
    let coordinator = Arc::new(ScanCoordinator::new(
        Arc::new(content.clone()),
        Arc::new(InMemoryProgressStore::new()),
        Arc::new(trigger.clone()),
        CoordinatorConfig::default().with_batch_size(2),
    ));
    let dispatcher = TriggerDispatcher::new(Arc::clone(&coordinator));
    let worker = tokio::spawn(dispatcher.run(receiver));

    let started = coordinator.start(&["post"]).await.unwrap();
    assert_eq!(started.progress.processed, 2);

    let snapshot = wait_until_completed(&coordinator).await;
    let progress = snapshot.progress().unwrap();
    assert_eq!(progress.processed, 9);
    assert_eq!(progress.percentage, 100);
    assert!(trigger.pending().await.is_empty());

    trigger.shutdown().await;
    drop(trigger);
    drop(coordinator);
    worker.abort();
}

#[tokio::test(start_paused = true)]
async fn duplicate_one_shot_jobs_fire_once() {
    let (trigger, mut receiver) = TokioTrigger::new();
    let job = TriggerJob::Continue(Continuation::new(
        ScanId::new(),
        vec![ct("post")],
        10,
    ));

    let delay = Duration::from_secs(1);
    assert!(trigger.schedule_once(delay, job.clone()).await.unwrap());
    assert!(!trigger.schedule_once(delay, job.clone()).await.unwrap());
    assert_eq!(trigger.pending().await.len(), 1);

    assert_eq!(receiver.recv().await, Some(job.clone()));
    assert!(trigger.pending().await.is_empty());

    // Once fired, the same key can be scheduled again.
    assert!(trigger.schedule_once(delay, job).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn daily_scan_runs_on_each_period() {
    let content = InMemoryContentSource::with_default_types().await;
    let ids = content
        .insert_many(&ct("page"), ItemStatus::Publish, 3)
        .await;
    let (trigger, receiver) = TokioTrigger::new();
    let coordinator = Arc::new(ScanCoordinator::new(
        Arc::new(content.clone()),
        Arc::new(InMemoryProgressStore::new()),
        Arc::new(trigger.clone()),
        CoordinatorConfig::default(),
    ));
    let worker =
        tokio::spawn(TriggerDispatcher::new(Arc::clone(&coordinator)).run(receiver));

    let period = Duration::from_secs(24 * 60 * 60);
    let types = vec!["post".to_string(), "page".to_string()];
    assert!(register_daily_scan(&trigger, period, types.clone()).await.unwrap());
    assert!(!register_daily_scan(&trigger, period, types).await.unwrap());
    assert!(coordinator.last_completed().await.unwrap().is_none());

    tokio::time::sleep(period + Duration::from_secs(1)).await;
    let snapshot = wait_until_completed(&coordinator).await;
    assert_eq!(snapshot.progress().unwrap().processed, 3);
    assert!(coordinator.last_completed().await.unwrap().is_some());
    for id in ids {
        assert!(content.last_scanned(id).await.is_some());
    }

    trigger.shutdown().await;
    worker.abort();
}
