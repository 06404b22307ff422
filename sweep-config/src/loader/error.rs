use std::path::PathBuf;

use thiserror::Error;

use crate::validation::ConfigGuardRailError;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to load .env file: {source}")]
    EnvFile {
        #[source]
        source: dotenvy::Error,
    },
    #[error("configuration file {path} does not exist")]
    MissingConfigFile { path: PathBuf },
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid duration for {field}: {value:?}: {source}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("invalid number for {field}: {value:?}: {source}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
}
