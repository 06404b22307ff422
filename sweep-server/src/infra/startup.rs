use anyhow::{Context, Result};
use async_trait::async_trait;
use sweep_core::{
    ports::TriggerJob,
    runtime::{TriggerDispatcher, register_daily_scan},
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::infra::app_state::AppState;

#[async_trait]
pub trait StartupHooks: Send + Sync {
    /// `jobs` carries fired trigger jobs when the state was built on a timer
    /// trigger.
    async fn run(
        &self,
        state: &AppState,
        jobs: Option<UnboundedReceiver<TriggerJob>>,
    ) -> Result<()>;
}

/// Starts the trigger dispatcher, registers the recurring scan and re-arms
/// any scan interrupted by a restart.
#[derive(Debug, Default)]
pub struct ProdStartupHooks;

#[async_trait]
impl StartupHooks for ProdStartupHooks {
    async fn run(
        &self,
        state: &AppState,
        jobs: Option<UnboundedReceiver<TriggerJob>>,
    ) -> Result<()> {
        match jobs {
            Some(jobs) => {
                let dispatcher =
                    TriggerDispatcher::new(state.coordinator().clone());
                tokio::spawn(dispatcher.run(jobs));
            }
            None => warn!(
                "no trigger receiver supplied; scheduled continuations will not run"
            ),
        }

        let scanner = &state.config().scanner;
        if scanner.daily_enabled && !scanner.daily_content_types.is_empty() {
            register_daily_scan(
                state.coordinator().trigger().as_ref(),
                scanner.daily_interval,
                scanner.daily_content_types.clone(),
            )
            .await
            .context("failed to register daily maintenance scan")?;
            info!(
                every = %humantime::format_duration(scanner.daily_interval),
                content_types = ?scanner.daily_content_types,
                "daily maintenance scan registered"
            );
        }

        if let Some(continuation) = state
            .coordinator()
            .resume_pending()
            .await
            .context("failed to resume interrupted scan")?
        {
            info!(
                scan_id = %continuation.scan_id,
                offset = continuation.offset,
                "interrupted scan re-armed"
            );
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NoopStartupHooks;

#[async_trait]
impl StartupHooks for NoopStartupHooks {
    async fn run(
        &self,
        _state: &AppState,
        _jobs: Option<UnboundedReceiver<TriggerJob>>,
    ) -> Result<()> {
        Ok(())
    }
}
