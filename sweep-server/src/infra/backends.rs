use std::sync::Arc;

use anyhow::Context;
use sweep_config::Config;
use sweep_core::{
    infrastructure::{
        InMemoryContentSource, InMemoryProgressStore, PostgresContentSource,
        PostgresProgressStore, postgres,
    },
    ports::{ContentSource, ProgressStore},
};
use tracing::{info, warn};

use crate::infra::demo::seed_demo_content;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Postgres,
    InMemory,
}

/// Storage adapters selected from configuration.
#[derive(Clone)]
pub struct Backends {
    pub content: Arc<dyn ContentSource>,
    pub progress: Arc<dyn ProgressStore>,
    pub kind: BackendKind,
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Backends {
    /// PostgreSQL when a database URL is configured, otherwise in-memory
    /// stores seeded with demo content.
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let Some(url) = config.database.url.as_deref() else {
            warn!(
                "no database configured - using in-memory demo content; scan state is lost on exit"
            );
            return Ok(Self::demo().await);
        };

        if !(url.starts_with("postgres://") || url.starts_with("postgresql://"))
        {
            anyhow::bail!(
                "Invalid database URL: must start with postgres:// or postgresql://"
            );
        }

        let pool = postgres::connect(url, config.database.max_connections)
            .await
            .context("failed to connect to PostgreSQL")?;
        info!("Connected to PostgreSQL");

        Ok(Self {
            content: Arc::new(PostgresContentSource::new(pool.clone())),
            progress: Arc::new(PostgresProgressStore::new(pool)),
            kind: BackendKind::Postgres,
        })
    }

    pub async fn demo() -> Self {
        let content = InMemoryContentSource::with_default_types().await;
        let seeded = seed_demo_content(&content).await;
        info!(items = seeded, "demo content seeded");
        Self::in_memory(content, InMemoryProgressStore::new())
    }

    pub fn in_memory(
        content: InMemoryContentSource,
        progress: InMemoryProgressStore,
    ) -> Self {
        Self {
            content: Arc::new(content),
            progress: Arc::new(progress),
            kind: BackendKind::InMemory,
        }
    }
}
