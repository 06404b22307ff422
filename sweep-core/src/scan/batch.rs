use std::sync::Arc;

use chrono::Utc;
use sweep_model::{BatchResult, ContentType};
use tracing::debug;

use crate::error::Result;
use crate::ports::ContentSource;
use crate::scan::eligibility::EligibilityRule;

/// Processes one window of eligible items: fetch a page, stamp it.
#[derive(Clone)]
pub struct BatchScanner {
    content: Arc<dyn ContentSource>,
}

impl std::fmt::Debug for BatchScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScanner").finish_non_exhaustive()
    }
}

impl BatchScanner {
    pub fn new(content: Arc<dyn ContentSource>) -> Self {
        Self { content }
    }

    /// Runs a batch over the named types. Names the content source does not
    /// know are ignored; if none are known the batch is empty.
    pub async fn run_batch(
        &self,
        content_types: &[ContentType],
        offset: u64,
        batch_size: u64,
    ) -> Result<BatchResult> {
        let known = self.content.content_types().await?;
        let selected: Vec<_> = known
            .into_iter()
            .filter(|info| content_types.contains(&info.name))
            .collect();
        let rule = EligibilityRule::for_types(&selected);
        self.run_with_rule(&rule, offset, batch_size).await
    }

    pub async fn run_with_rule(
        &self,
        rule: &EligibilityRule,
        offset: u64,
        batch_size: u64,
    ) -> Result<BatchResult> {
        if rule.is_empty() || batch_size == 0 {
            return Ok(BatchResult::default());
        }

        let items = self.content.page(rule, offset, batch_size).await?;
        if !items.is_empty() {
            self.content.mark_scanned(&items, Utc::now()).await?;
        }

        debug!(
            target: "sweep::batch",
            offset,
            batch_size,
            items = items.len(),
            "batch processed"
        );
        Ok(BatchResult {
            items_processed: items.len() as u64,
        })
    }
}
