pub mod error;

use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::constants::{
    CONFIG_FILE_CANDIDATES, DEFAULT_HOST, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT,
};
use crate::models::scanner::ScannerConfig;
use crate::models::sources::{EnvConfig, FileConfig};
use crate::models::{
    AuthConfig, Config, ConfigMetadata, DatabaseConfig, ServerConfig,
};
use crate::validation::{ConfigWarnings, validate};

use error::ConfigLoadError;

/// Composed configuration plus whatever the loader found worth mentioning.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

/// Builds a [`Config`] from, in increasing precedence: built-in defaults, a
/// TOML file, and environment variables (optionally seeded from `.env`).
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    search_root: Option<PathBuf>,
    load_env_file: bool,
    env: Option<EnvConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            search_root: None,
            load_env_file: true,
            env: None,
        }
    }

    /// Use this file instead of searching. It must exist.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Directory the default config locations are resolved against.
    /// Defaults to the working directory.
    pub fn with_search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_root = Some(root.into());
        self
    }

    pub fn with_env_file(mut self, enabled: bool) -> Self {
        self.load_env_file = enabled;
        self
    }

    /// Use these overrides instead of reading the process environment.
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env = Some(env);
        self
    }

    pub fn load(self) -> Result<ConfigLoad, ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        let env_file_loaded = if self.load_env_file {
            match dotenvy::dotenv() {
                Ok(path) => {
                    debug!(path = %path.display(), "loaded .env file");
                    true
                }
                Err(err) if err.not_found() => false,
                Err(source) => return Err(ConfigLoadError::EnvFile { source }),
            }
        } else {
            false
        };

        let env = self.env.clone().unwrap_or_else(EnvConfig::gather);

        let config_path = self.resolve_config_path(&env)?;
        let file = match &config_path {
            Some(path) => read_file_config(path)?,
            None => {
                warnings.push_with_hint(
                    "no configuration file found; using defaults and environment",
                    format!(
                        "create {} or set SWEEP_CONFIG",
                        CONFIG_FILE_CANDIDATES.join(" or ")
                    ),
                );
                FileConfig::default()
            }
        };

        let config = compose(
            file,
            env,
            ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        )?;
        warnings.extend(validate(&config)?);

        Ok(ConfigLoad { config, warnings })
    }

    fn resolve_config_path(
        &self,
        env: &EnvConfig,
    ) -> Result<Option<PathBuf>, ConfigLoadError> {
        if let Some(path) =
            self.config_path.as_ref().or(env.config_path.as_ref())
        {
            if !path.is_file() {
                return Err(ConfigLoadError::MissingConfigFile {
                    path: path.clone(),
                });
            }
            return Ok(Some(path.clone()));
        }

        let root = self.search_root.clone().unwrap_or_default();
        Ok(CONFIG_FILE_CANDIDATES
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.is_file()))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let raw =
        std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&raw).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_duration(
    field: &'static str,
    value: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match value {
        Some(value) => humantime::parse_duration(value.trim()).map_err(
            |source| ConfigLoadError::InvalidDuration {
                field,
                value,
                source,
            },
        ),
        None => Ok(default),
    }
}

fn parse_number<T>(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigLoadError>
where
    T: FromStr<Err = ParseIntError>,
{
    value
        .map(|value| {
            value.trim().parse().map_err(|source| {
                ConfigLoadError::InvalidNumber {
                    field,
                    value,
                    source,
                }
            })
        })
        .transpose()
}

fn compose(
    file: FileConfig,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<Config, ConfigLoadError> {
    let defaults = ScannerConfig::default();

    let scanner = ScannerConfig {
        batch_size: parse_number("scanner.batch_size", env.batch_size)?
            .or(file.scanner.batch_size)
            .unwrap_or(defaults.batch_size),
        continuation_delay: parse_duration(
            "scanner.continuation_delay",
            env.continuation_delay.or(file.scanner.continuation_delay),
            defaults.continuation_delay,
        )?,
        daily_enabled: env
            .daily_enabled
            .or(file.scanner.daily_enabled)
            .unwrap_or(defaults.daily_enabled),
        daily_interval: parse_duration(
            "scanner.daily_interval",
            env.daily_interval.or(file.scanner.daily_interval),
            defaults.daily_interval,
        )?,
        daily_content_types: env
            .daily_content_types
            .or(file.scanner.daily_content_types)
            .unwrap_or(defaults.daily_content_types),
    };

    Ok(Config {
        server: ServerConfig {
            host: env
                .server_host
                .or(file.server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_number("server.port", env.server_port)?
                .or(file.server.port)
                .unwrap_or(DEFAULT_PORT),
        },
        database: DatabaseConfig {
            url: env
                .database_url
                .or(file.database.url)
                .filter(|url| !url.trim().is_empty()),
            max_connections: parse_number(
                "database.max_connections",
                env.database_max_connections,
            )?
            .or(file.database.max_connections)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        },
        scanner,
        auth: AuthConfig {
            admin_token: env
                .admin_token
                .or(file.auth.admin_token)
                .filter(|token| !token.trim().is_empty()),
        },
        metadata,
    })
}
