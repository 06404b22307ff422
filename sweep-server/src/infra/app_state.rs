use std::{fmt, sync::Arc};

use sweep_config::Config;
use sweep_core::{
    ports::{ContentSource, ProgressStore, ScanTrigger},
    scan::ScanCoordinator,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub coordinator: Arc<ScanCoordinator>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        content: Arc<dyn ContentSource>,
        progress: Arc<dyn ProgressStore>,
        trigger: Arc<dyn ScanTrigger>,
    ) -> Self {
        let coordinator = Arc::new(ScanCoordinator::new(
            content,
            progress,
            trigger,
            config.scanner.coordinator_config(),
        ));
        Self {
            config,
            coordinator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn coordinator(&self) -> &Arc<ScanCoordinator> {
        &self.coordinator
    }

    pub fn admin_token(&self) -> Option<&str> {
        self.config.auth.admin_token.as_deref()
    }
}
