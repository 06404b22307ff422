use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sweep_model::ScanId;

use crate::error::Result;
use crate::scan::continuation::Continuation;

/// Work a trigger hands back to the dispatcher when it fires.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerJob {
    /// Process the next batch of a running scan.
    Continue(Continuation),
    /// Periodic full scan over a fixed set of content types.
    RecurringScan {
        name: String,
        content_types: Vec<String>,
    },
}

/// Identity used to refuse double registration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TriggerJobKey {
    Continue { scan_id: ScanId, offset: u64 },
    Recurring(String),
}

impl TriggerJob {
    pub fn dedupe_key(&self) -> TriggerJobKey {
        match self {
            TriggerJob::Continue(continuation) => TriggerJobKey::Continue {
                scan_id: continuation.scan_id,
                offset: continuation.offset,
            },
            TriggerJob::RecurringScan { name, .. } => {
                TriggerJobKey::Recurring(name.clone())
            }
        }
    }
}

/// Deferred and periodic re-entry into the scan coordinator.
///
/// Registration is idempotent: scheduling a job whose key is already pending
/// (or a recurring job that is already registered) returns `Ok(false)` and
/// changes nothing.
#[async_trait]
pub trait ScanTrigger: Send + Sync {
    async fn schedule_once(&self, delay: Duration, job: TriggerJob)
    -> Result<bool>;

    async fn schedule_recurring(
        &self,
        period: Duration,
        job: TriggerJob,
    ) -> Result<bool>;
}
