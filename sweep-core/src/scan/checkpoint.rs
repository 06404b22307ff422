use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use sweep_model::ScanProgress;

use crate::error::{Result, SweepError};
use crate::ports::ProgressStore;

pub const PROGRESS_KEY: &str = "scan_progress";
pub const OFFSET_KEY: &str = "scan_offset";
pub const LAST_COMPLETED_KEY: &str = "last_completed_at";

/// Typed access to the three records a scan keeps in the progress store.
#[derive(Clone)]
pub struct CheckpointStore {
    store: Arc<dyn ProgressStore>,
}

impl std::fmt::Debug for CheckpointStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckpointStore").finish_non_exhaustive()
    }
}

impl CheckpointStore {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self { store }
    }

    /// Current progress record with `revision` set to the stored revision.
    pub async fn load_progress(&self) -> Result<Option<ScanProgress>> {
        let Some(record) = self.store.get(PROGRESS_KEY).await? else {
            return Ok(None);
        };
        let mut progress: ScanProgress = serde_json::from_value(record.value)?;
        progress.revision = record.revision;
        Ok(Some(progress))
    }

    /// Writes `progress`. With `expected` set the write only lands if nobody
    /// else wrote in between. Returns the record as stored.
    pub async fn save_progress(
        &self,
        progress: &ScanProgress,
        expected: Option<u64>,
    ) -> Result<ScanProgress> {
        let value = serde_json::to_value(progress)?;
        let revision = self.store.set(PROGRESS_KEY, value, expected).await?;
        let mut stored = progress.clone();
        stored.revision = revision;
        Ok(stored)
    }

    pub async fn delete_progress(&self) -> Result<()> {
        self.store.delete(PROGRESS_KEY).await
    }

    pub async fn load_offset(&self) -> Result<Option<u64>> {
        let Some(record) = self.store.get(OFFSET_KEY).await? else {
            return Ok(None);
        };
        record.value.as_u64().map(Some).ok_or_else(|| {
            SweepError::Storage(format!(
                "{OFFSET_KEY} holds a non-integer value: {}",
                record.value
            ))
        })
    }

    pub async fn save_offset(&self, offset: u64) -> Result<()> {
        self.store.set(OFFSET_KEY, Value::from(offset), None).await?;
        Ok(())
    }

    pub async fn clear_offset(&self) -> Result<()> {
        self.store.delete(OFFSET_KEY).await
    }

    pub async fn mark_last_completed(&self, at: DateTime<Utc>) -> Result<()> {
        self.store
            .set(LAST_COMPLETED_KEY, json!(at.to_rfc3339()), None)
            .await?;
        Ok(())
    }

    pub async fn last_completed(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(record) = self.store.get(LAST_COMPLETED_KEY).await? else {
            return Ok(None);
        };
        let raw = record.value.as_str().ok_or_else(|| {
            SweepError::Storage(format!(
                "{LAST_COMPLETED_KEY} is not a timestamp string"
            ))
        })?;
        DateTime::parse_from_rfc3339(raw)
            .map(|at| Some(at.with_timezone(&Utc)))
            .map_err(|err| {
                SweepError::Storage(format!(
                    "{LAST_COMPLETED_KEY} is not RFC 3339: {err}"
                ))
            })
    }
}
