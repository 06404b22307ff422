//! Configuration for Sweep.
//!
//! [`ConfigLoader`] layers built-in defaults, an optional TOML file and
//! environment overrides (optionally seeded from `.env`) into a [`Config`],
//! then applies guard rails. Problems that do not stop startup come back as
//! [`ConfigWarnings`] for the caller to log.

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError};
pub use models::scanner::ScannerConfig;
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    AuthConfig, Config, ConfigMetadata, DatabaseConfig, ServerConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
