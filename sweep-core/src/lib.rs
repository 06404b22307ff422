//! # Sweep Core
//!
//! Resumable, batched scanning of a paginated content store.
//!
//! ## Overview
//!
//! A scan walks every *eligible* item of the selected content types (published
//! items, or `inherit` for attachments), stamps each one with a "last scanned"
//! time and checkpoints its progress after every batch, so the walk survives
//! process restarts and can be driven by timers, HTTP polls or a CLI loop.
//!
//! - [`scan::ScanCoordinator`]: lifecycle, bookkeeping and continuations
//! - [`scan::BatchScanner`]: one page of work
//! - [`ports`]: the content source, progress store and scheduler trigger seams
//! - [`runtime`]: tokio timer trigger and the dispatcher feeding it back
//! - [`infrastructure`]: in-memory and PostgreSQL adapters
//!
//! ## Feature Flags
//!
//! - `database`: PostgreSQL adapters and migrations (SQLx)
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sweep_core::infrastructure::{
//!     InMemoryContentSource, InMemoryProgressStore, ManualTrigger,
//! };
//! use sweep_core::scan::{CoordinatorConfig, ScanCoordinator};
//!
//! async fn scan_everything() -> sweep_core::Result<()> {
//!     let coordinator = ScanCoordinator::new(
//!         Arc::new(InMemoryContentSource::with_default_types().await),
//!         Arc::new(InMemoryProgressStore::new()),
//!         Arc::new(ManualTrigger::new()),
//!         CoordinatorConfig::default(),
//!     );
//!     let summary = coordinator.run_to_completion(&["post", "page"]).await?;
//!     println!("processed {} items", summary.processed);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod infrastructure;
pub mod ports;
pub mod runtime;
pub mod scan;

pub use error::{Result, SweepError};
pub use sweep_model as model;
