use std::time::Duration;

/// Items handled per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: u64 = 50;

/// Delay between a batch finishing and its continuation firing.
pub const DEFAULT_CONTINUATION_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub batch_size: u64,
    pub continuation_delay: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            continuation_delay: DEFAULT_CONTINUATION_DELAY,
        }
    }
}

impl CoordinatorConfig {
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_continuation_delay(mut self, delay: Duration) -> Self {
        self.continuation_delay = delay;
        self
    }
}
