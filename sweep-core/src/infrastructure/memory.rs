//! Process-local adapters for tests and the demo server.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sweep_model::{
    ContentKind, ContentType, ContentTypeInfo, ItemId, ItemStatus,
};
use tokio::sync::{Mutex, RwLock};

use crate::error::{Result, SweepError};
use crate::ports::{
    ContentSource, ProgressStore, ScanTrigger, StoredRecord, TriggerJob,
    TriggerJobKey,
};
use crate::scan::eligibility::EligibilityRule;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentItem {
    pub id: ItemId,
    pub content_type: ContentType,
    pub status: ItemStatus,
    pub last_scanned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct ContentState {
    types: Vec<ContentTypeInfo>,
    items: BTreeMap<ItemId, ContentItem>,
    next_id: i64,
    unavailable: bool,
}

/// Content store held in memory. Identifiers are assigned in insertion
/// order starting at 1.
#[derive(Clone, Default)]
pub struct InMemoryContentSource {
    state: Arc<RwLock<ContentState>>,
}

impl fmt::Debug for InMemoryContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("InMemoryContentSource");
        match self.state.try_read() {
            Ok(state) => {
                debug
                    .field("types", &state.types.len())
                    .field("items", &state.items.len());
            }
            Err(_) => {
                debug.field("state", &"<locked>");
            }
        }
        debug.finish()
    }
}

impl InMemoryContentSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// `post`, `page` and `attachment`, all public.
    pub async fn with_default_types() -> Self {
        let source = Self::new();
        for (name, label, kind) in [
            ("post", "Post", ContentKind::Ordinary),
            ("page", "Page", ContentKind::Ordinary),
            ("attachment", "Media", ContentKind::Attachment),
        ] {
            if let Ok(name) = ContentType::parse(name) {
                source
                    .register_type(ContentTypeInfo::new(name, label, kind, true))
                    .await;
            }
        }
        source
    }

    /// Adds or replaces a content type definition.
    pub async fn register_type(&self, info: ContentTypeInfo) {
        let mut state = self.state.write().await;
        match state.types.iter_mut().find(|t| t.name == info.name) {
            Some(existing) => *existing = info,
            None => state.types.push(info),
        }
    }

    pub async fn insert(
        &self,
        content_type: &ContentType,
        status: ItemStatus,
    ) -> ItemId {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = ItemId(state.next_id);
        state.items.insert(
            id,
            ContentItem {
                id,
                content_type: content_type.clone(),
                status,
                last_scanned_at: None,
            },
        );
        id
    }

    pub async fn insert_many(
        &self,
        content_type: &ContentType,
        status: ItemStatus,
        count: usize,
    ) -> Vec<ItemId> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(self.insert(content_type, status).await);
        }
        ids
    }

    pub async fn remove(&self, id: ItemId) -> Option<ContentItem> {
        self.state.write().await.items.remove(&id)
    }

    pub async fn item(&self, id: ItemId) -> Option<ContentItem> {
        self.state.read().await.items.get(&id).cloned()
    }

    pub async fn items(&self) -> Vec<ContentItem> {
        self.state.read().await.items.values().cloned().collect()
    }

    pub async fn last_scanned(&self, id: ItemId) -> Option<DateTime<Utc>> {
        self.item(id).await.and_then(|item| item.last_scanned_at)
    }

    /// Makes every call fail with a storage error until cleared.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.write().await.unavailable = unavailable;
    }
}

fn ensure_available(unavailable: bool) -> Result<()> {
    if unavailable {
        return Err(SweepError::Storage(
            "content source unavailable".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl ContentSource for InMemoryContentSource {
    async fn content_types(&self) -> Result<Vec<ContentTypeInfo>> {
        let state = self.state.read().await;
        ensure_available(state.unavailable)?;
        Ok(state.types.clone())
    }

    async fn count(&self, rule: &EligibilityRule) -> Result<u64> {
        let state = self.state.read().await;
        ensure_available(state.unavailable)?;
        Ok(state
            .items
            .values()
            .filter(|item| rule.matches(&item.content_type, item.status))
            .count() as u64)
    }

    async fn page(
        &self,
        rule: &EligibilityRule,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<ItemId>> {
        let state = self.state.read().await;
        ensure_available(state.unavailable)?;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(state
            .items
            .values()
            .filter(|item| rule.matches(&item.content_type, item.status))
            .skip(offset)
            .take(limit)
            .map(|item| item.id)
            .collect())
    }

    async fn mark_scanned(
        &self,
        items: &[ItemId],
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        ensure_available(state.unavailable)?;
        for id in items {
            if let Some(item) = state.items.get_mut(id) {
                item.last_scanned_at = Some(at);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    records: HashMap<String, StoredRecord>,
    unavailable: bool,
}

/// Key-value progress store with the same revision rules as the database
/// adapter.
#[derive(Clone, Default)]
pub struct InMemoryProgressStore {
    state: Arc<Mutex<ProgressState>>,
}

impl fmt::Debug for InMemoryProgressStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("InMemoryProgressStore");
        match self.state.try_lock() {
            Ok(state) => {
                let mut keys: Vec<_> = state.records.keys().collect();
                keys.sort();
                debug.field("keys", &keys);
            }
            Err(_) => {
                debug.field("state", &"<locked>");
            }
        }
        debug.finish()
    }
}

impl InMemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> =
            self.state.lock().await.records.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Makes every call fail with a storage error until cleared.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn get(&self, key: &str) -> Result<Option<StoredRecord>> {
        let state = self.state.lock().await;
        ensure_available(state.unavailable)?;
        Ok(state.records.get(key).cloned())
    }

    async fn set(
        &self,
        key: &str,
        value: Value,
        expected_revision: Option<u64>,
    ) -> Result<u64> {
        let mut state = self.state.lock().await;
        ensure_available(state.unavailable)?;

        let current = state.records.get(key).map_or(0, |r| r.revision);
        if let Some(expected) = expected_revision
            && expected != current
        {
            return Err(SweepError::Conflict {
                key: key.to_string(),
                expected,
                found: current,
            });
        }

        let revision = current + 1;
        state
            .records
            .insert(key.to_string(), StoredRecord { value, revision });
        Ok(revision)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        ensure_available(state.unavailable)?;
        state.records.remove(key);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ManualState {
    once: Vec<(Duration, TriggerJob)>,
    pending: HashSet<TriggerJobKey>,
    recurring: Vec<(Duration, TriggerJob)>,
}

/// Trigger that only records what was scheduled. Tests fire jobs by hand.
#[derive(Clone, Debug, Default)]
pub struct ManualTrigger {
    state: Arc<Mutex<ManualState>>,
}

impl ManualTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains scheduled one-shot jobs, as if they had all fired.
    pub async fn take_scheduled(&self) -> Vec<TriggerJob> {
        let mut state = self.state.lock().await;
        state.pending.clear();
        state.once.drain(..).map(|(_, job)| job).collect()
    }

    pub async fn scheduled(&self) -> Vec<(Duration, TriggerJob)> {
        self.state.lock().await.once.clone()
    }

    pub async fn recurring(&self) -> Vec<(Duration, TriggerJob)> {
        self.state.lock().await.recurring.clone()
    }
}

#[async_trait]
impl ScanTrigger for ManualTrigger {
    async fn schedule_once(
        &self,
        delay: Duration,
        job: TriggerJob,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;
        if !state.pending.insert(job.dedupe_key()) {
            return Ok(false);
        }
        state.once.push((delay, job));
        Ok(true)
    }

    async fn schedule_recurring(
        &self,
        period: Duration,
        job: TriggerJob,
    ) -> Result<bool> {
        let mut state = self.state.lock().await;
        let key = job.dedupe_key();
        if state.recurring.iter().any(|(_, j)| j.dedupe_key() == key) {
            return Ok(false);
        }
        state.recurring.push((period, job));
        Ok(true)
    }
}
