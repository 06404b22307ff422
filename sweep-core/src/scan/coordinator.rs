use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sweep_model::{
    ContentType, ContentTypeInfo, ScanId, ScanProgress, ScanSnapshot,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SweepError};
use crate::ports::{ContentSource, ProgressStore, ScanTrigger, TriggerJob};
use crate::scan::batch::BatchScanner;
use crate::scan::checkpoint::CheckpointStore;
use crate::scan::config::CoordinatorConfig;
use crate::scan::continuation::Continuation;
use crate::scan::eligibility::{EligibilityRule, TypeSelection, select_types};

/// Result of starting a scan: progress after the first batch plus the
/// requested names that were dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StartOutcome {
    pub progress: ScanProgress,
    pub ignored_types: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContinueOutcome {
    Advanced(ScanProgress),
    /// The continuation no longer describes the persisted scan. Nothing was
    /// touched.
    Stale(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub content_type: ContentType,
    pub label: String,
    pub eligible: u64,
}

/// Per-type eligible counts under the same filtering `start` applies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CountSummary {
    pub per_type: Vec<TypeCount>,
    pub total: u64,
    pub ignored_types: Vec<String>,
}

/// What a synchronous run did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub scan_id: ScanId,
    pub per_type: Vec<TypeCount>,
    pub total: u64,
    pub processed: u64,
    pub ignored_types: Vec<String>,
    pub elapsed: Duration,
    pub progress: ScanProgress,
}

/// Progress reported by [`ScanCoordinator::run_to_completion_with`].
#[derive(Clone, Copy, Debug)]
pub enum RunEvent<'a> {
    /// Types resolved and counted; nothing has been written yet.
    Selected {
        per_type: &'a [TypeCount],
        ignored_types: &'a [String],
    },
    /// One batch was applied.
    Advanced(&'a ScanProgress),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Hand the next batch to the scheduler trigger.
    Trigger,
    /// Caller loops; nothing is scheduled.
    Inline,
}

/// Owns the scan lifecycle and every write to the progress record.
///
/// All read-modify-write cycles run under one async mutex, and progress
/// writes carry the revision they were computed from, so a second process
/// sharing the store gets [`SweepError::Conflict`] instead of a lost update.
pub struct ScanCoordinator {
    content: Arc<dyn ContentSource>,
    checkpoints: CheckpointStore,
    trigger: Arc<dyn ScanTrigger>,
    scanner: BatchScanner,
    config: CoordinatorConfig,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for ScanCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanCoordinator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ScanCoordinator {
    pub fn new(
        content: Arc<dyn ContentSource>,
        progress: Arc<dyn ProgressStore>,
        trigger: Arc<dyn ScanTrigger>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            scanner: BatchScanner::new(Arc::clone(&content)),
            checkpoints: CheckpointStore::new(progress),
            content,
            trigger,
            config,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn trigger(&self) -> &Arc<dyn ScanTrigger> {
        &self.trigger
    }

    /// Starts a fresh scan, superseding whatever was recorded before, and
    /// processes its first batch before returning.
    #[instrument(skip_all, fields(requested = requested.len()))]
    pub async fn start<S: AsRef<str>>(
        &self,
        requested: &[S],
    ) -> Result<StartOutcome> {
        let _guard = self.write_lock.lock().await;

        let selection = self.select(requested).await?;
        let counts = self.count_selection(&selection).await?;
        let total = counts.iter().map(|count| count.eligible).sum();

        let progress = self.begin(selection.names(), total).await?;
        let progress = if progress.is_processing() {
            self.advance(progress, &selection.rule(), 0, Mode::Trigger)
                .await?
        } else {
            progress
        };

        Ok(StartOutcome {
            progress,
            ignored_types: selection.ignored,
        })
    }

    /// Processes the batch a scheduled continuation describes.
    #[instrument(skip_all, fields(scan_id = %continuation.scan_id, offset = continuation.offset))]
    pub async fn continue_scan(
        &self,
        continuation: &Continuation,
    ) -> Result<ContinueOutcome> {
        let _guard = self.write_lock.lock().await;

        let Some(progress) = self.checkpoints.load_progress().await? else {
            return Ok(stale("no scan recorded"));
        };
        if progress.scan_id != continuation.scan_id {
            return Ok(stale("scan was superseded"));
        }
        if progress.content_types != continuation.content_types {
            return Ok(stale("content types differ from the recorded scan"));
        }
        if !progress.is_processing() {
            return Ok(stale("scan is no longer processing"));
        }
        match self.checkpoints.load_offset().await? {
            Some(offset) if offset == continuation.offset => {}
            Some(_) => return Ok(stale("offset already advanced")),
            None => return Ok(stale("offset cursor missing")),
        }

        let rule = self.rule_for(&progress.content_types).await?;
        let progress = self
            .advance(progress, &rule, continuation.offset, Mode::Trigger)
            .await?;
        Ok(ContinueOutcome::Advanced(progress))
    }

    /// Advances the recorded scan from its persisted cursor. Used when a
    /// client polls instead of waiting for the trigger.
    #[instrument(skip_all)]
    pub async fn continue_current(&self) -> Result<ScanProgress> {
        let _guard = self.write_lock.lock().await;

        let progress = match self.checkpoints.load_progress().await? {
            Some(progress) if progress.is_processing() => progress,
            _ => return Err(SweepError::NoActiveScan),
        };
        let offset = self
            .checkpoints
            .load_offset()
            .await?
            .unwrap_or(progress.processed);

        let rule = self.rule_for(&progress.content_types).await?;
        self.advance(progress, &rule, offset, Mode::Trigger).await
    }

    /// Re-arms the trigger for a scan a previous process left processing.
    /// Returns the continuation that was scheduled, if any.
    #[instrument(skip_all)]
    pub async fn resume_pending(&self) -> Result<Option<Continuation>> {
        let _guard = self.write_lock.lock().await;

        let progress = match self.checkpoints.load_progress().await? {
            Some(progress) if progress.is_processing() => progress,
            _ => return Ok(None),
        };
        let offset = match self.checkpoints.load_offset().await? {
            Some(offset) => offset,
            None => {
                self.checkpoints.save_offset(progress.processed).await?;
                progress.processed
            }
        };

        let continuation = Continuation::new(
            progress.scan_id,
            progress.content_types.clone(),
            offset,
        );
        self.trigger
            .schedule_once(
                self.config.continuation_delay,
                TriggerJob::Continue(continuation.clone()),
            )
            .await?;
        info!(
            scan_id = %progress.scan_id,
            offset,
            "resuming interrupted scan"
        );
        Ok(Some(continuation))
    }

    pub async fn status(&self) -> Result<ScanSnapshot> {
        Ok(self.checkpoints.load_progress().await?.into())
    }

    /// Runs a whole scan inline, holding the write lock throughout.
    pub async fn run_to_completion<S: AsRef<str>>(
        &self,
        requested: &[S],
    ) -> Result<RunSummary> {
        self.run_to_completion_with(requested, |_| {}).await
    }

    /// Like [`Self::run_to_completion`], reporting the resolved selection and
    /// every batch to `observe` as it happens.
    #[instrument(skip_all, fields(requested = requested.len()))]
    pub async fn run_to_completion_with<S, F>(
        &self,
        requested: &[S],
        mut observe: F,
    ) -> Result<RunSummary>
    where
        S: AsRef<str>,
        F: FnMut(RunEvent<'_>),
    {
        let _guard = self.write_lock.lock().await;
        let started = Instant::now();

        let selection = self.select(requested).await?;
        let per_type = self.count_selection(&selection).await?;
        let total = per_type.iter().map(|count| count.eligible).sum();
        let rule = selection.rule();
        observe(RunEvent::Selected {
            per_type: &per_type,
            ignored_types: &selection.ignored,
        });

        let mut progress = self.begin(selection.names(), total).await?;
        while progress.is_processing() {
            let offset = progress.processed;
            progress = self.advance(progress, &rule, offset, Mode::Inline).await?;
            observe(RunEvent::Advanced(&progress));
        }

        Ok(RunSummary {
            scan_id: progress.scan_id,
            per_type,
            total,
            processed: progress.processed,
            ignored_types: selection.ignored,
            elapsed: started.elapsed(),
            progress,
        })
    }

    /// Forgets the recorded scan. Pending continuations become stale.
    #[instrument(skip_all)]
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.checkpoints.delete_progress().await?;
        self.checkpoints.clear_offset().await?;
        info!("scan state reset");
        Ok(())
    }

    pub async fn count<S: AsRef<str>>(
        &self,
        requested: &[S],
    ) -> Result<CountSummary> {
        let selection = self.select(requested).await?;
        let per_type = self.count_selection(&selection).await?;
        Ok(CountSummary {
            total: per_type.iter().map(|count| count.eligible).sum(),
            per_type,
            ignored_types: selection.ignored,
        })
    }

    pub async fn content_types(&self) -> Result<Vec<ContentTypeInfo>> {
        self.content.content_types().await
    }

    pub async fn public_content_types(&self) -> Result<Vec<ContentTypeInfo>> {
        let mut types = self.content.content_types().await?;
        types.retain(|info| info.public);
        Ok(types)
    }

    pub async fn last_completed(&self) -> Result<Option<DateTime<Utc>>> {
        self.checkpoints.last_completed().await
    }

    async fn select<S: AsRef<str>>(
        &self,
        requested: &[S],
    ) -> Result<TypeSelection> {
        let known = self.content.content_types().await?;
        select_types(requested, &known)
    }

    async fn rule_for(
        &self,
        content_types: &[ContentType],
    ) -> Result<EligibilityRule> {
        let known = self.content.content_types().await?;
        let selected: Vec<_> = content_types
            .iter()
            .filter_map(|name| known.iter().find(|info| &info.name == name))
            .cloned()
            .collect();
        Ok(EligibilityRule::for_types(&selected))
    }

    async fn count_selection(
        &self,
        selection: &TypeSelection,
    ) -> Result<Vec<TypeCount>> {
        let mut counts = Vec::with_capacity(selection.selected.len());
        for info in &selection.selected {
            let eligible =
                self.content.count(&EligibilityRule::single(info)).await?;
            counts.push(TypeCount {
                content_type: info.name.clone(),
                label: info.label.clone(),
                eligible,
            });
        }
        Ok(counts)
    }

    /// Writes the fresh record and cursor. An empty scan is completed on the
    /// spot.
    async fn begin(
        &self,
        content_types: Vec<ContentType>,
        total: u64,
    ) -> Result<ScanProgress> {
        let now = Utc::now();
        let mut progress = ScanProgress::started(content_types, total, now);

        if total == 0 {
            progress.mark_completed(now);
            let stored = self.checkpoints.save_progress(&progress, None).await?;
            self.checkpoints.clear_offset().await?;
            self.checkpoints.mark_last_completed(now).await?;
            info!(scan_id = %stored.scan_id, "nothing eligible, scan completed");
            return Ok(stored);
        }

        let stored = self.checkpoints.save_progress(&progress, None).await?;
        self.checkpoints.save_offset(0).await?;
        info!(
            scan_id = %stored.scan_id,
            total,
            content_types = ?stored.content_types,
            "scan started"
        );
        Ok(stored)
    }

    async fn advance(
        &self,
        mut progress: ScanProgress,
        rule: &EligibilityRule,
        offset: u64,
        mode: Mode,
    ) -> Result<ScanProgress> {
        let batch = self
            .scanner
            .run_with_rule(rule, offset, self.config.batch_size)
            .await?;
        let expected = progress.revision;
        let processed = offset
            .saturating_add(batch.items_processed)
            .min(progress.total);

        if batch.is_empty() && processed < progress.total {
            warn!(
                scan_id = %progress.scan_id,
                expected = progress.total,
                found = processed,
                "content ran out before the expected total, lowering total"
            );
            progress.total = processed;
        }

        if processed >= progress.total {
            let now = Utc::now();
            progress.mark_completed(now);
            let stored = self
                .checkpoints
                .save_progress(&progress, Some(expected))
                .await?;
            self.checkpoints.clear_offset().await?;
            self.checkpoints.mark_last_completed(now).await?;
            info!(
                scan_id = %stored.scan_id,
                processed = stored.processed,
                "scan completed"
            );
            return Ok(stored);
        }

        progress.advance_to(processed);
        let stored = self
            .checkpoints
            .save_progress(&progress, Some(expected))
            .await?;
        self.checkpoints.save_offset(processed).await?;
        debug!(
            scan_id = %stored.scan_id,
            processed,
            total = stored.total,
            percentage = stored.percentage,
            "scan advanced"
        );

        if mode == Mode::Trigger {
            let continuation = Continuation::new(
                stored.scan_id,
                stored.content_types.clone(),
                processed,
            );
            let scheduled = self
                .trigger
                .schedule_once(
                    self.config.continuation_delay,
                    TriggerJob::Continue(continuation),
                )
                .await?;
            if !scheduled {
                debug!(offset = processed, "continuation already pending");
            }
        }
        Ok(stored)
    }
}

fn stale(reason: &str) -> ContinueOutcome {
    debug!(reason, "ignoring stale continuation");
    ContinueOutcome::Stale(reason.to_string())
}
