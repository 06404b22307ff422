//! In-process scheduler trigger and the loop that feeds its jobs back into
//! the coordinator.

pub mod dispatcher;
pub mod tokio_trigger;

pub use dispatcher::{DAILY_SCAN_JOB, TriggerDispatcher, register_daily_scan};
pub use tokio_trigger::TokioTrigger;
