use serde::{Deserialize, Serialize};

use marketbook_core::StallId;

/// "Something changed" notice pushed by a sync adapter.
///
/// Notices are hints, not diffs: receivers re-fetch the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeNotice {
    /// A single stall row was written.
    StallUpdated { id: StallId },
    /// Rows were bulk-inserted.
    Inserted { count: usize },
    /// The whole table was cleared.
    Cleared,
    /// A change observed on the backend without a known origin.
    External,
}
