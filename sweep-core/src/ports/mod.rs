//! Seams to the systems the scanner does not own: where content lives, where
//! progress is checkpointed, and what re-enters the coordinator later.

pub mod content_source;
pub mod progress_store;
pub mod trigger;

pub use content_source::ContentSource;
pub use progress_store::{ProgressStore, StoredRecord};
pub use trigger::{ScanTrigger, TriggerJob, TriggerJobKey};
