use chrono::{DateTime, Utc};

use crate::ids::{ContentType, ScanId};

/// Lifecycle of a scan. There is no failure state: a scan that stops
/// advancing stays `Processing` until it is reset or superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScanStatus {
    #[default]
    NotStarted,
    Processing,
    Completed,
}

impl ScanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::NotStarted => "not_started",
            ScanStatus::Processing => "processing",
            ScanStatus::Completed => "completed",
        }
    }
}

/// `round(processed / total * 100)`, rounding halves up, or 0 when there is
/// nothing to process.
pub fn percentage(processed: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let processed = u128::from(processed.min(total));
    let total = u128::from(total);
    ((processed * 200 + total) / (total * 2)) as u8
}

/// The persisted progress record of the in-flight or last completed scan.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanProgress {
    pub scan_id: ScanId,
    pub content_types: Vec<ContentType>,
    pub status: ScanStatus,
    pub total: u64,
    pub processed: u64,
    pub percentage: u8,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Store revision this copy was read at. Filled in on read, never
    /// persisted.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing))]
    pub revision: u64,
}

impl ScanProgress {
    /// Fresh record for a scan that is about to process its first batch.
    pub fn started(
        content_types: Vec<ContentType>,
        total: u64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            scan_id: ScanId::new(),
            content_types,
            status: ScanStatus::Processing,
            total,
            processed: 0,
            percentage: 0,
            started_at: Some(now),
            completed_at: None,
            revision: 0,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.status == ScanStatus::Processing
    }

    pub fn is_completed(&self) -> bool {
        self.status == ScanStatus::Completed
    }

    /// Moves `processed` forward. Never moves backwards and never passes
    /// `total`.
    pub fn advance_to(&mut self, processed: u64) {
        self.processed = processed.clamp(self.processed, self.total);
        self.percentage = percentage(self.processed, self.total);
    }

    /// Terminal transition. `processed` is pinned to `total`.
    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.processed = self.total;
        self.percentage = 100;
        self.status = ScanStatus::Completed;
        self.completed_at = Some(now);
    }
}

/// What a status reader sees: the stored record, or a bare
/// `{"status": "not_started"}` when no scan has ever run.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ScanSnapshot {
    Scan(ScanProgress),
    NotStarted { status: ScanStatus },
}

impl ScanSnapshot {
    pub fn not_started() -> Self {
        ScanSnapshot::NotStarted {
            status: ScanStatus::NotStarted,
        }
    }

    pub fn status(&self) -> ScanStatus {
        match self {
            ScanSnapshot::Scan(progress) => progress.status,
            ScanSnapshot::NotStarted { status } => *status,
        }
    }

    pub fn progress(&self) -> Option<&ScanProgress> {
        match self {
            ScanSnapshot::Scan(progress) => Some(progress),
            ScanSnapshot::NotStarted { .. } => None,
        }
    }
}

impl From<Option<ScanProgress>> for ScanSnapshot {
    fn from(value: Option<ScanProgress>) -> Self {
        value.map(ScanSnapshot::Scan).unwrap_or_else(Self::not_started)
    }
}

/// Outcome of applying one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchResult {
    pub items_processed: u64,
}

impl BatchResult {
    pub fn is_empty(&self) -> bool {
        self.items_processed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(0, 25), 0);
        assert_eq!(percentage(10, 25), 40);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(25, 25), 100);
        assert_eq!(percentage(0, 0), 0);
    }

    #[test]
    fn advance_never_regresses_or_overshoots() {
        let mut progress = ScanProgress::started(Vec::new(), 25, Utc::now());
        progress.advance_to(10);
        progress.advance_to(5);
        assert_eq!(progress.processed, 10);
        progress.advance_to(40);
        assert_eq!(progress.processed, 25);
        assert_eq!(progress.percentage, 100);
        assert!(progress.is_processing());
    }

    #[test]
    fn not_started_serializes_bare() {
        let json = serde_json::to_value(ScanSnapshot::not_started()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "not_started" }));

        let back: ScanSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back.status(), ScanStatus::NotStarted);
    }

    #[test]
    fn progress_serializes_flat() {
        let mut progress = ScanProgress::started(
            vec![ContentType::parse("post").unwrap()],
            4,
            Utc::now(),
        );
        progress.advance_to(1);
        let json = serde_json::to_value(ScanSnapshot::Scan(progress)).unwrap();
        assert_eq!(json["status"], "processing");
        assert_eq!(json["total"], 4);
        assert_eq!(json["processed"], 1);
        assert_eq!(json["percentage"], 25);
        assert_eq!(json["content_types"][0], "post");
    }
}
