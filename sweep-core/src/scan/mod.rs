//! Resumable, batched scan over published content.
//!
//! A scan is started once, processes its first batch inline, and then
//! re-enters itself through a [`crate::ports::ScanTrigger`] until every
//! eligible item has been stamped. All durable state lives behind
//! [`checkpoint::CheckpointStore`] so any process can pick a scan back up.

pub mod batch;
pub mod checkpoint;
pub mod config;
pub mod continuation;
pub mod coordinator;
pub mod eligibility;

pub use batch::BatchScanner;
pub use checkpoint::CheckpointStore;
pub use config::CoordinatorConfig;
pub use continuation::Continuation;
pub use coordinator::{
    ContinueOutcome, CountSummary, RunEvent, RunSummary, ScanCoordinator,
    StartOutcome, TypeCount,
};
pub use eligibility::{EligibilityRule, TypeSelection, select_types};
