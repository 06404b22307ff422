use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::{non_empty_var, parse_bool_var, parse_csv_var};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub scanner: FileScannerConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

/// Durations are humantime strings such as `"1s"` or `"24h"`.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileScannerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_delay: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_content_types: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
}

/// Overrides read from the process environment.
///
/// Numbers and durations are kept as raw text; the loader parses them so a
/// malformed value fails with the field it belongs to.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<String>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<String>,
    pub batch_size: Option<String>,
    pub continuation_delay: Option<String>,
    pub daily_enabled: Option<bool>,
    pub daily_interval: Option<String>,
    pub daily_content_types: Option<Vec<String>>,
    pub admin_token: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: non_empty_var("SWEEP_CONFIG").map(PathBuf::from),
            server_host: non_empty_var("SERVER_HOST"),
            server_port: non_empty_var("SERVER_PORT"),
            database_url: non_empty_var("DATABASE_URL"),
            database_max_connections: non_empty_var("DATABASE_MAX_CONNECTIONS"),
            batch_size: non_empty_var("SWEEP_BATCH_SIZE"),
            continuation_delay: non_empty_var("SWEEP_CONTINUATION_DELAY"),
            daily_enabled: parse_bool_var("SWEEP_DAILY_ENABLED"),
            daily_interval: non_empty_var("SWEEP_DAILY_INTERVAL"),
            daily_content_types: parse_csv_var("SWEEP_DAILY_CONTENT_TYPES"),
            admin_token: non_empty_var("SWEEP_ADMIN_TOKEN"),
        }
    }
}
