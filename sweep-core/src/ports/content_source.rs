use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sweep_model::{ContentTypeInfo, ItemId};

use crate::error::Result;
use crate::scan::eligibility::EligibilityRule;

/// Paginated, read-mostly view over the content store.
///
/// Implementations must order pages by [`ItemId`] ascending so that
/// consecutive offsets never skip or revisit items, and must never filter or
/// sort on the scan marker written by [`ContentSource::mark_scanned`].
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Every content type the store knows about.
    async fn content_types(&self) -> Result<Vec<ContentTypeInfo>>;

    /// Number of items matching `rule`.
    async fn count(&self, rule: &EligibilityRule) -> Result<u64>;

    /// Up to `limit` matching identifiers starting at `offset`.
    async fn page(
        &self,
        rule: &EligibilityRule,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ItemId>>;

    /// Stamp each item with its last scan time. Re-stamping is harmless.
    async fn mark_scanned(&self, items: &[ItemId], at: DateTime<Utc>)
    -> Result<()>;
}
