#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Result, anyhow};
use axum_test::TestServer;
use sweep_config::{
    AuthConfig, Config, ConfigMetadata, DatabaseConfig, ScannerConfig,
    ServerConfig,
};
use sweep_core::infrastructure::{
    InMemoryContentSource, InMemoryProgressStore, ManualTrigger,
};
use sweep_model::{ContentType, ContentTypeInfo, ContentKind, ItemStatus};
use sweep_server::{
    AppState,
    infra::startup::{NoopStartupHooks, StartupHooks},
    routes::create_app,
};

pub fn content_type(name: &str) -> ContentType {
    ContentType::parse(name).unwrap()
}

pub fn test_config(batch_size: u64, admin_token: Option<&str>) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: None,
            max_connections: 1,
        },
        scanner: ScannerConfig {
            batch_size,
            daily_enabled: false,
            ..ScannerConfig::default()
        },
        auth: AuthConfig {
            admin_token: admin_token.map(str::to_string),
        },
        metadata: ConfigMetadata::default(),
    }
}

/// Router over in-memory stores with a trigger that only records jobs.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub content: InMemoryContentSource,
    pub progress: InMemoryProgressStore,
    pub trigger: ManualTrigger,
}

impl TestApp {
    pub async fn build(config: Config) -> Result<Self> {
        Self::build_with_hooks(config, &NoopStartupHooks).await
    }

    pub async fn build_with_hooks(
        config: Config,
        hooks: &dyn StartupHooks,
    ) -> Result<Self> {
        let content = InMemoryContentSource::with_default_types().await;
        content
            .register_type(ContentTypeInfo::new(
                content_type("revision"),
                "Revision",
                ContentKind::Ordinary,
                false,
            ))
            .await;
        let progress = InMemoryProgressStore::new();
        let trigger = ManualTrigger::new();

        let state = AppState::new(
            Arc::new(config),
            Arc::new(content.clone()),
            Arc::new(progress.clone()),
            Arc::new(trigger.clone()),
        );
        hooks.run(&state, None).await?;

        let server = TestServer::new(create_app(state.clone()))
            .map_err(|err| anyhow!(err.to_string()))?;

        Ok(Self {
            server,
            state,
            content,
            progress,
            trigger,
        })
    }

    /// Inserts published posts, published pages and some drafts.
    pub async fn seed(&self, posts: usize, pages: usize) {
        self.content
            .insert_many(&content_type("post"), ItemStatus::Publish, posts)
            .await;
        self.content
            .insert_many(&content_type("page"), ItemStatus::Publish, pages)
            .await;
        self.content
            .insert_many(&content_type("post"), ItemStatus::Draft, 3)
            .await;
    }
}
