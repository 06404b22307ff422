//! Data model shared across the Sweep crates: content types, item states and
//! the persisted scan progress record.
#![allow(missing_docs)]

pub use ::chrono;

pub mod content;
pub mod error;
pub mod ids;
pub mod scan;

pub use content::{ContentKind, ContentTypeInfo, ItemStatus};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ContentType, ItemId, MAX_CONTENT_TYPE_LEN, ScanId};
pub use scan::{
    BatchResult, ScanProgress, ScanSnapshot, ScanStatus, percentage,
};
