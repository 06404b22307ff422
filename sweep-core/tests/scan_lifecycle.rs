use std::sync::Arc;

use sweep_core::SweepError;
use sweep_core::infrastructure::{
    InMemoryContentSource, InMemoryProgressStore, ManualTrigger,
};
use sweep_core::ports::{ProgressStore, ScanTrigger, TriggerJob};
use sweep_core::scan::{
    CheckpointStore, Continuation, ContinueOutcome, CoordinatorConfig,
    RunEvent, ScanCoordinator,
};
use sweep_model::{ContentType, ItemStatus, ScanSnapshot, ScanStatus};

struct Harness {
    content: InMemoryContentSource,
    store: InMemoryProgressStore,
    trigger: ManualTrigger,
    coordinator: ScanCoordinator,
}

async fn harness(batch_size: u64) -> Harness {
    let content = InMemoryContentSource::with_default_types().await;
    let store = InMemoryProgressStore::new();
    let trigger = ManualTrigger::new();
    let coordinator = ScanCoordinator::new(
        Arc::new(content.clone()),
        Arc::new(store.clone()),
        Arc::new(trigger.clone()),
        CoordinatorConfig::default().with_batch_size(batch_size),
    );
    Harness {
        content,
        store,
        trigger,
        coordinator,
    }
}

fn ct(name: &str) -> ContentType {
    ContentType::parse(name).unwrap()
}

fn only_continuation(jobs: Vec<TriggerJob>) -> Continuation {
    assert_eq!(jobs.len(), 1, "expected exactly one scheduled job: {jobs:?}");
    match jobs.into_iter().next() {
        Some(TriggerJob::Continue(continuation)) => continuation,
        other => panic!("unexpected job {other:?}"),
    }
}

#[tokio::test]
async fn twenty_five_posts_in_batches_of_ten() {
    let h = harness(10).await;
    h.content
        .insert_many(&ct("post"), ItemStatus::Publish, 25)
        .await;

    let started = h.coordinator.start(&["post"]).await.unwrap();
    let progress = started.progress;
    assert_eq!(progress.status, ScanStatus::Processing);
    assert_eq!(progress.total, 25);
    assert_eq!(progress.processed, 10);
    assert_eq!(progress.percentage, 40);
    assert!(started.ignored_types.is_empty());

    let next = only_continuation(h.trigger.take_scheduled().await);
    assert_eq!(next.offset, 10);
    assert_eq!(next.scan_id, progress.scan_id);

    let ContinueOutcome::Advanced(progress) =
        h.coordinator.continue_scan(&next).await.unwrap()
    else {
        panic!("continuation at 10 should advance");
    };
    assert_eq!(progress.processed, 20);
    assert_eq!(progress.percentage, 80);

    let next = only_continuation(h.trigger.take_scheduled().await);
    assert_eq!(next.offset, 20);
    let ContinueOutcome::Advanced(progress) =
        h.coordinator.continue_scan(&next).await.unwrap()
    else {
        panic!("continuation at 20 should advance");
    };
    assert_eq!(progress.status, ScanStatus::Completed);
    assert_eq!(progress.processed, 25);
    assert_eq!(progress.percentage, 100);
    assert!(progress.completed_at.is_some());

    assert!(h.trigger.take_scheduled().await.is_empty());
    let keys = h.store.keys().await;
    assert!(!keys.contains(&"scan_offset".to_string()));
    assert!(h.coordinator.last_completed().await.unwrap().is_some());
}

#[tokio::test]
async fn run_to_completion_tags_only_eligible_items() {
    let h = harness(3).await;
    let published = h
        .content
        .insert_many(&ct("post"), ItemStatus::Publish, 5)
        .await;
    let pages = h
        .content
        .insert_many(&ct("page"), ItemStatus::Publish, 2)
        .await;
    let draft = h.content.insert(&ct("post"), ItemStatus::Draft).await;
    let inherit_post = h.content.insert(&ct("post"), ItemStatus::Inherit).await;
    let media = h.content.insert(&ct("attachment"), ItemStatus::Inherit).await;

    let summary = h.coordinator.run_to_completion(&["post"]).await.unwrap();
    assert_eq!(summary.total, 5);
    assert_eq!(summary.processed, 5);
    assert_eq!(summary.per_type.len(), 1);
    assert_eq!(summary.per_type[0].eligible, 5);
    assert!(h.trigger.take_scheduled().await.is_empty());

    let started_at = summary.progress.started_at.unwrap();
    for id in published {
        let tagged = h.content.last_scanned(id).await.unwrap();
        assert!(tagged >= started_at);
    }
    for id in pages.into_iter().chain([draft, inherit_post, media]) {
        assert!(h.content.last_scanned(id).await.is_none(), "{id} tagged");
    }
}

#[tokio::test]
async fn mixed_post_and_attachment_counts_without_overlap() {
    let h = harness(50).await;
    h.content
        .insert_many(&ct("post"), ItemStatus::Publish, 4)
        .await;
    h.content
        .insert_many(&ct("attachment"), ItemStatus::Inherit, 3)
        .await;
    // Neither of these may be counted: wrong status for their own type.
    h.content.insert(&ct("post"), ItemStatus::Inherit).await;
    h.content.insert(&ct("attachment"), ItemStatus::Publish).await;

    let counts = h.coordinator.count(&["post", "attachment"]).await.unwrap();
    assert_eq!(counts.total, 7);

    let summary = h
        .coordinator
        .run_to_completion(&["post", "attachment"])
        .await
        .unwrap();
    assert_eq!(summary.total, 7);
    assert_eq!(summary.processed, 7);

    let tagged = h
        .content
        .items()
        .await
        .into_iter()
        .filter(|item| item.last_scanned_at.is_some())
        .count();
    assert_eq!(tagged, 7);
}

#[tokio::test]
async fn empty_selection_completes_immediately() {
    let h = harness(10).await;
    h.content.insert(&ct("post"), ItemStatus::Draft).await;

    let started = h.coordinator.start(&["post"]).await.unwrap();
    assert_eq!(started.progress.status, ScanStatus::Completed);
    assert_eq!(started.progress.total, 0);
    assert_eq!(started.progress.processed, 0);
    assert_eq!(started.progress.percentage, 100);
    assert!(h.trigger.take_scheduled().await.is_empty());
}

#[tokio::test]
async fn bogus_type_is_rejected_without_writing() {
    let h = harness(10).await;

    let err = h.coordinator.start(&["bogus_type"]).await.unwrap_err();
    assert!(matches!(err, SweepError::InvalidInput(_)));
    let empty: [&str; 0] = [];
    let err = h.coordinator.start(&empty).await.unwrap_err();
    assert!(matches!(err, SweepError::InvalidInput(_)));

    assert!(h.store.keys().await.is_empty());
    assert_eq!(
        h.coordinator.status().await.unwrap(),
        ScanSnapshot::not_started()
    );
}

#[tokio::test]
async fn partially_invalid_types_are_filtered() {
    let h = harness(10).await;
    h.content
        .insert_many(&ct("page"), ItemStatus::Publish, 2)
        .await;

    let started = h.coordinator.start(&["page", "bogus"]).await.unwrap();
    assert_eq!(started.ignored_types, vec!["bogus".to_string()]);
    assert_eq!(started.progress.content_types, vec![ct("page")]);
    assert_eq!(started.progress.status, ScanStatus::Completed);
}

#[tokio::test]
async fn redelivered_continuation_is_stale_and_harmless() {
    let h = harness(2).await;
    h.content
        .insert_many(&ct("post"), ItemStatus::Publish, 5)
        .await;

    h.coordinator.start(&["post"]).await.unwrap();
    let next = only_continuation(h.trigger.take_scheduled().await);

    let first = h.coordinator.continue_scan(&next).await.unwrap();
    let ContinueOutcome::Advanced(after_first) = first else {
        panic!("first delivery should advance");
    };
    let again = h.coordinator.continue_scan(&next).await.unwrap();
    assert!(matches!(again, ContinueOutcome::Stale(_)));

    let ScanSnapshot::Scan(now) = h.coordinator.status().await.unwrap() else {
        panic!("scan should be recorded");
    };
    assert_eq!(now.processed, after_first.processed);
    assert_eq!(now.processed, 4);
}

#[tokio::test]
async fn processed_never_decreases() {
    let h = harness(4).await;
    h.content
        .insert_many(&ct("post"), ItemStatus::Publish, 13)
        .await;

    let mut last = h.coordinator.start(&["post"]).await.unwrap().progress;
    while last.is_processing() {
        let next = only_continuation(h.trigger.take_scheduled().await);
        let ContinueOutcome::Advanced(progress) =
            h.coordinator.continue_scan(&next).await.unwrap()
        else {
            panic!("continuation should advance");
        };
        assert!(progress.processed >= last.processed);
        assert!(progress.processed <= progress.total);
        last = progress;
    }
    assert_eq!(last.processed, 13);
}

#[tokio::test]
async fn reset_makes_pending_work_stale() {
    let h = harness(2).await;
    h.content
        .insert_many(&ct("post"), ItemStatus::Publish, 6)
        .await;

    h.coordinator.start(&["post"]).await.unwrap();
    let next = only_continuation(h.trigger.take_scheduled().await);

    h.coordinator.reset().await.unwrap();
    assert_eq!(
        h.coordinator.status().await.unwrap(),
        ScanSnapshot::not_started()
    );
    let outcome = h.coordinator.continue_scan(&next).await.unwrap();
    assert!(matches!(outcome, ContinueOutcome::Stale(_)));
}

#[tokio::test]
async fn restart_supersedes_previous_scan() {
    let h = harness(2).await;
    h.content
        .insert_many(&ct("post"), ItemStatus::Publish, 6)
        .await;

    let first = h.coordinator.start(&["post"]).await.unwrap().progress;
    let old = only_continuation(h.trigger.take_scheduled().await);
    let second = h.coordinator.start(&["post"]).await.unwrap().progress;
    assert_ne!(first.scan_id, second.scan_id);

    let outcome = h.coordinator.continue_scan(&old).await.unwrap();
    assert!(matches!(outcome, ContinueOutcome::Stale(_)));
    let fresh = only_continuation(h.trigger.take_scheduled().await);
    assert_eq!(fresh.scan_id, second.scan_id);
}

#[tokio::test]
async fn continuation_is_scheduled_once_per_offset() {
    let h = harness(2).await;
    h.content
        .insert_many(&ct("post"), ItemStatus::Publish, 6)
        .await;

    let progress = h.coordinator.start(&["post"]).await.unwrap().progress;
    // Replaying the same schedule request is refused by the trigger.
    let duplicate = TriggerJob::Continue(Continuation::new(
        progress.scan_id,
        progress.content_types.clone(),
        2,
    ));
    let accepted = h
        .coordinator
        .trigger()
        .schedule_once(std::time::Duration::from_secs(1), duplicate)
        .await
        .unwrap();
    assert!(!accepted);
    assert_eq!(h.trigger.scheduled().await.len(), 1);
}

#[tokio::test]
async fn continue_current_follows_the_stored_cursor() {
    let h = harness(3).await;
    h.content
        .insert_many(&ct("post"), ItemStatus::Publish, 7)
        .await;

    let err = h.coordinator.continue_current().await.unwrap_err();
    assert!(matches!(err, SweepError::NoActiveScan));

    h.coordinator.start(&["post"]).await.unwrap();
    let scheduled = only_continuation(h.trigger.take_scheduled().await);

    let progress = h.coordinator.continue_current().await.unwrap();
    assert_eq!(progress.processed, 6);
    let progress = h.coordinator.continue_current().await.unwrap();
    assert!(progress.is_completed());
    assert_eq!(progress.percentage, 100);

    let outcome = h.coordinator.continue_scan(&scheduled).await.unwrap();
    assert!(matches!(outcome, ContinueOutcome::Stale(_)));
    let err = h.coordinator.continue_current().await.unwrap_err();
    assert!(matches!(err, SweepError::NoActiveScan));
}

#[tokio::test]
async fn shrinking_content_lowers_total() {
    let h = harness(2).await;
    let ids = h
        .content
        .insert_many(&ct("post"), ItemStatus::Publish, 4)
        .await;

    h.coordinator.start(&["post"]).await.unwrap();
    let next = only_continuation(h.trigger.take_scheduled().await);
    for id in &ids[2..] {
        h.content.remove(*id).await;
    }

    let ContinueOutcome::Advanced(progress) =
        h.coordinator.continue_scan(&next).await.unwrap()
    else {
        panic!("continuation should advance");
    };
    assert!(progress.is_completed());
    assert_eq!(progress.total, 2);
    assert_eq!(progress.processed, 2);
    assert_eq!(progress.percentage, 100);
}

#[tokio::test]
async fn stale_revision_write_is_rejected() {
    let h = harness(2).await;
    h.content
        .insert_many(&ct("post"), ItemStatus::Publish, 6)
        .await;
    h.coordinator.start(&["post"]).await.unwrap();

    let store: Arc<dyn ProgressStore> = Arc::new(h.store.clone());
    let checkpoints = CheckpointStore::new(Arc::clone(&store));
    let ours = checkpoints.load_progress().await.unwrap().unwrap();

    // Another process writes between our read and our write.
    let record = store.get("scan_progress").await.unwrap().unwrap();
    store
        .set("scan_progress", record.value, Some(record.revision))
        .await
        .unwrap();

    let err = checkpoints
        .save_progress(&ours, Some(ours.revision))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SweepError::Conflict { expected, found, .. }
            if found == expected + 1
    ));
}

#[tokio::test]
async fn storage_failure_leaves_scan_processing() {
    let h = harness(2).await;
    h.content
        .insert_many(&ct("post"), ItemStatus::Publish, 4)
        .await;

    h.coordinator.start(&["post"]).await.unwrap();
    let next = only_continuation(h.trigger.take_scheduled().await);

    h.content.set_unavailable(true).await;
    let err = h.coordinator.continue_scan(&next).await.unwrap_err();
    assert!(err.is_storage());

    h.content.set_unavailable(false).await;
    let ScanSnapshot::Scan(progress) = h.coordinator.status().await.unwrap()
    else {
        panic!("scan should still be recorded");
    };
    assert!(progress.is_processing());
    assert_eq!(progress.processed, 2);

    let ContinueOutcome::Advanced(progress) =
        h.coordinator.continue_scan(&next).await.unwrap()
    else {
        panic!("retry from the same offset should advance");
    };
    assert!(progress.is_completed());
}

#[tokio::test]
async fn interrupted_scan_resumes_from_its_cursor() {
    let h = harness(3).await;
    h.content
        .insert_many(&ct("post"), ItemStatus::Publish, 8)
        .await;
    let started = h.coordinator.start(&["post"]).await.unwrap().progress;

    // Simulate a restart: the scheduled job died with the old process.
    h.trigger.take_scheduled().await;
    let restarted = ScanCoordinator::new(
        Arc::new(h.content.clone()),
        Arc::new(h.store.clone()),
        Arc::new(h.trigger.clone()),
        CoordinatorConfig::default().with_batch_size(3),
    );

    let resumed = restarted.resume_pending().await.unwrap().unwrap();
    assert_eq!(resumed.scan_id, started.scan_id);
    assert_eq!(resumed.offset, 3);
    assert_eq!(only_continuation(h.trigger.take_scheduled().await), resumed);

    let mut outcome = restarted.continue_scan(&resumed).await.unwrap();
    while let ContinueOutcome::Advanced(progress) = &outcome {
        if progress.is_completed() {
            break;
        }
        let next = only_continuation(h.trigger.take_scheduled().await);
        outcome = restarted.continue_scan(&next).await.unwrap();
    }
    let ContinueOutcome::Advanced(done) = outcome else {
        panic!("scan should finish");
    };
    assert_eq!(done.processed, 8);
    assert!(restarted.resume_pending().await.unwrap().is_none());
}

#[tokio::test]
async fn inline_run_reports_selection_then_each_batch() {
    let h = harness(4).await;
    h.content
        .insert_many(&ct("post"), ItemStatus::Publish, 10)
        .await;

    let mut selected = Vec::new();
    let mut ignored = Vec::new();
    let mut batches = Vec::new();
    let summary = h
        .coordinator
        .run_to_completion_with(&["post", "bogus"], |event| match event {
            RunEvent::Selected {
                per_type,
                ignored_types,
            } => {
                selected.extend(
                    per_type
                        .iter()
                        .map(|c| (c.content_type.to_string(), c.eligible)),
                );
                ignored.extend_from_slice(ignored_types);
            }
            RunEvent::Advanced(progress) => batches.push(progress.processed),
        })
        .await
        .unwrap();

    assert_eq!(selected, vec![("post".to_string(), 10)]);
    assert_eq!(ignored, vec!["bogus".to_string()]);
    assert_eq!(batches, vec![4, 8, 10]);
    assert_eq!(summary.processed, 10);
    assert_eq!(summary.ignored_types, vec!["bogus".to_string()]);
}
