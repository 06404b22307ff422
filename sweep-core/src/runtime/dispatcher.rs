use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::ports::{ScanTrigger, TriggerJob};
use crate::scan::{ContinueOutcome, ScanCoordinator};

/// Name of the recurring full scan registered at startup.
pub const DAILY_SCAN_JOB: &str = "daily_maintenance";

/// Registers the periodic full scan. Returns `false` when it already is.
pub async fn register_daily_scan(
    trigger: &dyn ScanTrigger,
    period: Duration,
    content_types: Vec<String>,
) -> Result<bool> {
    trigger
        .schedule_recurring(
            period,
            TriggerJob::RecurringScan {
                name: DAILY_SCAN_JOB.to_string(),
                content_types,
            },
        )
        .await
}

/// Feeds fired trigger jobs back into the coordinator.
#[derive(Debug, Clone)]
pub struct TriggerDispatcher {
    coordinator: Arc<ScanCoordinator>,
}

impl TriggerDispatcher {
    pub fn new(coordinator: Arc<ScanCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Drains `receiver` until every sender is gone.
    pub async fn run(self, mut receiver: mpsc::UnboundedReceiver<TriggerJob>) {
        while let Some(job) = receiver.recv().await {
            self.dispatch(job).await;
        }
        debug!("trigger channel closed, dispatcher exiting");
    }

    /// Handles one job. Failures are logged; the next trigger retries from
    /// the persisted cursor.
    pub async fn dispatch(&self, job: TriggerJob) {
        match job {
            TriggerJob::Continue(continuation) => {
                match self.coordinator.continue_scan(&continuation).await {
                    Ok(ContinueOutcome::Advanced(progress)) => info!(
                        scan_id = %progress.scan_id,
                        processed = progress.processed,
                        total = progress.total,
                        percentage = progress.percentage,
                        "continuation processed"
                    ),
                    Ok(ContinueOutcome::Stale(reason)) => {
                        debug!(%reason, "stale continuation dropped")
                    }
                    Err(err) => error!(
                        scan_id = %continuation.scan_id,
                        offset = continuation.offset,
                        "continuation failed: {err}"
                    ),
                }
            }
            TriggerJob::RecurringScan {
                name,
                content_types,
            } => match self.coordinator.run_to_completion(&content_types).await {
                Ok(summary) => {
                    if !summary.ignored_types.is_empty() {
                        warn!(
                            job = %name,
                            ignored = ?summary.ignored_types,
                            "recurring scan skipped unknown content types"
                        );
                    }
                    info!(
                        job = %name,
                        processed = summary.processed,
                        elapsed_ms = summary.elapsed.as_millis() as u64,
                        "recurring scan completed"
                    );
                }
                Err(err) => error!(job = %name, "recurring scan failed: {err}"),
            },
        }
    }
}
