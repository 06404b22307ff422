use std::fmt;

use thiserror::Error;

use crate::constants::SLOW_CONTINUATION_DELAY;
use crate::models::Config;

/// Non-fatal observation about the loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hint {
            Some(hint) => write!(f, "{} ({hint})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push(&mut self, message: impl Into<String>) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint(
        &mut self,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

/// Settings the server refuses to start with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigGuardRailError {
    #[error("scanner.batch_size must be greater than zero")]
    ZeroBatchSize,
    #[error("scanner.daily_interval must be greater than zero")]
    ZeroDailyInterval,
    #[error("server.port must be greater than zero")]
    ZeroPort,
    #[error("database.max_connections must be greater than zero")]
    ZeroMaxConnections,
}

/// Checks guard rails and collects warnings for questionable settings.
pub fn validate(config: &Config) -> Result<ConfigWarnings, ConfigGuardRailError> {
    if config.server.port == 0 {
        return Err(ConfigGuardRailError::ZeroPort);
    }
    if config.scanner.batch_size == 0 {
        return Err(ConfigGuardRailError::ZeroBatchSize);
    }
    if config.scanner.daily_enabled && config.scanner.daily_interval.is_zero() {
        return Err(ConfigGuardRailError::ZeroDailyInterval);
    }
    if config.database.max_connections == 0 {
        return Err(ConfigGuardRailError::ZeroMaxConnections);
    }

    let mut warnings = ConfigWarnings::default();
    if config.database.url.is_none() {
        warnings.push_with_hint(
            "no database configured; scan state and content are kept in memory and lost on restart",
            "set DATABASE_URL or [database].url",
        );
    }
    if config.scanner.continuation_delay > SLOW_CONTINUATION_DELAY {
        warnings.push_with_hint(
            format!(
                "scanner.continuation_delay is {}; scans will advance slowly",
                humantime::format_duration(config.scanner.continuation_delay)
            ),
            "a delay of a few seconds is usually enough",
        );
    }
    if config.scanner.daily_enabled
        && config.scanner.daily_content_types.is_empty()
    {
        warnings.push_with_hint(
            "daily scan is enabled but has no content types; it will be skipped",
            "set SWEEP_DAILY_CONTENT_TYPES or [scanner].daily_content_types",
        );
    }
    Ok(warnings)
}
