use serde::{Deserialize, Serialize};
use sweep_model::{ContentType, ScanId};

/// Everything a deferred batch needs to resume the scan it was scheduled for.
///
/// The coordinator refuses continuations whose scan id, types or offset no
/// longer match the persisted state, so a late or duplicated delivery is
/// harmless.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Continuation {
    pub scan_id: ScanId,
    pub content_types: Vec<ContentType>,
    pub offset: u64,
}

impl Continuation {
    pub fn new(
        scan_id: ScanId,
        content_types: Vec<ContentType>,
        offset: u64,
    ) -> Self {
        Self {
            scan_id,
            content_types,
            offset,
        }
    }
}
