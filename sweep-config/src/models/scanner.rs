use std::time::Duration;

use sweep_core::scan::CoordinatorConfig;
use sweep_core::scan::config::{DEFAULT_BATCH_SIZE, DEFAULT_CONTINUATION_DELAY};

use crate::constants::{DEFAULT_DAILY_CONTENT_TYPES, DEFAULT_DAILY_INTERVAL};

/// How scans are paced and when the recurring full scan runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Items processed per batch. Larger batches finish sooner but hold the
    /// content store longer per invocation.
    pub batch_size: u64,
    /// Wait between one batch finishing and the next being triggered.
    pub continuation_delay: Duration,
    /// Whether the recurring full scan is registered at startup.
    pub daily_enabled: bool,
    pub daily_interval: Duration,
    pub daily_content_types: Vec<String>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            continuation_delay: DEFAULT_CONTINUATION_DELAY,
            daily_enabled: true,
            daily_interval: DEFAULT_DAILY_INTERVAL,
            daily_content_types: DEFAULT_DAILY_CONTENT_TYPES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl ScannerConfig {
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig::default()
            .with_batch_size(self.batch_size)
            .with_continuation_delay(self.continuation_delay)
    }
}
