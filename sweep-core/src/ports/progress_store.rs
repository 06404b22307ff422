use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A stored value together with the revision it was written at.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub value: Value,
    pub revision: u64,
}

/// Durable key-value storage for small JSON records.
///
/// Every successful write bumps the key's revision. Writers may pass the
/// revision they read to get compare-and-swap semantics:
///
/// - `None` writes unconditionally,
/// - `Some(0)` only succeeds when the key is absent,
/// - `Some(n)` only succeeds when the key is currently at revision `n`.
///
/// A failed comparison returns [`crate::SweepError::Conflict`].
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<StoredRecord>>;

    /// Returns the new revision.
    async fn set(
        &self,
        key: &str,
        value: Value,
        expected_revision: Option<u64>,
    ) -> Result<u64>;

    /// Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
