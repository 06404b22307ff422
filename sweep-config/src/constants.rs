use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

pub const DEFAULT_DAILY_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Content types covered by the recurring scan when none are configured.
pub const DEFAULT_DAILY_CONTENT_TYPES: &[&str] = &["post", "page"];

/// Files probed, in order, when no config path is given.
pub const CONFIG_FILE_CANDIDATES: &[&str] = &["sweep.toml", "config/sweep.toml"];

/// Continuation delays longer than this stall interactive clients.
pub const SLOW_CONTINUATION_DELAY: Duration = Duration::from_secs(60);
