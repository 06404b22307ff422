use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Result, SweepError};
use crate::ports::{ScanTrigger, TriggerJob, TriggerJobKey};

#[derive(Default)]
struct TriggerState {
    pending: HashSet<TriggerJobKey>,
    recurring: HashMap<TriggerJobKey, JoinHandle<()>>,
}

/// Timer-backed trigger. Fired jobs are delivered on the channel returned by
/// [`TokioTrigger::new`].
#[derive(Clone)]
pub struct TokioTrigger {
    state: Arc<Mutex<TriggerState>>,
    sender: mpsc::UnboundedSender<TriggerJob>,
    shutdown: CancellationToken,
}

impl fmt::Debug for TokioTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (pending, recurring) = match self.state.try_lock() {
            Ok(state) => (Some(state.pending.len()), Some(state.recurring.len())),
            Err(_) => (None, None),
        };
        f.debug_struct("TokioTrigger")
            .field("pending", &pending)
            .field("recurring", &recurring)
            .field("cancelled", &self.shutdown.is_cancelled())
            .finish()
    }
}

impl TokioTrigger {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TriggerJob>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let trigger = Self {
            state: Arc::new(Mutex::new(TriggerState::default())),
            sender,
            shutdown: CancellationToken::new(),
        };
        (trigger, receiver)
    }

    /// Keys of one-shot jobs that have not fired yet.
    pub async fn pending(&self) -> Vec<TriggerJobKey> {
        self.state.lock().await.pending.iter().cloned().collect()
    }

    /// Stops all timers. Jobs that have not fired are dropped.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let mut state = self.state.lock().await;
        state.pending.clear();
        for (_, handle) in state.recurring.drain() {
            handle.abort();
        }
    }

    fn closed(&self) -> Result<()> {
        if self.shutdown.is_cancelled() || self.sender.is_closed() {
            return Err(SweepError::Internal(
                "scan trigger is shut down".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ScanTrigger for TokioTrigger {
    async fn schedule_once(
        &self,
        delay: Duration,
        job: TriggerJob,
    ) -> Result<bool> {
        self.closed()?;
        let key = job.dedupe_key();
        {
            let mut state = self.state.lock().await;
            if !state.pending.insert(key.clone()) {
                return Ok(false);
            }
        }

        let state = Arc::clone(&self.state);
        let sender = self.sender.clone();
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    state.lock().await.pending.remove(&key);
                    if sender.send(job).is_err() {
                        warn!("trigger receiver dropped, job discarded");
                    }
                }
            }
        });
        debug!(?delay, "one-shot job scheduled");
        Ok(true)
    }

    async fn schedule_recurring(
        &self,
        period: Duration,
        job: TriggerJob,
    ) -> Result<bool> {
        self.closed()?;
        if period.is_zero() {
            return Err(SweepError::InvalidInput(
                "recurring period must be positive".to_string(),
            ));
        }

        let key = job.dedupe_key();
        let mut state = self.state.lock().await;
        if state.recurring.contains_key(&key) {
            return Ok(false);
        }

        let sender = self.sender.clone();
        let shutdown = self.shutdown.clone();
        let first = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(first, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticks.tick() => {
                        if sender.send(job.clone()).is_err() {
                            warn!("trigger receiver dropped, stopping recurring job");
                            break;
                        }
                    }
                }
            }
        });
        state.recurring.insert(key, handle);
        debug!(?period, "recurring job registered");
        Ok(true)
    }
}
