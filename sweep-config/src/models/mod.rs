pub mod scanner;
pub mod sources;

use std::path::PathBuf;

use scanner::ScannerConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub scanner: ScannerConfig,
    pub auth: AuthConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// `true` when no database is configured and in-memory storage is used.
    pub fn is_ephemeral(&self) -> bool {
        self.database.url.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Bearer token required on maintenance routes. `None` leaves access
    /// control to whatever sits in front of the server.
    pub admin_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "admin_token",
                &self.admin_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
