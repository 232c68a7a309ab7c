use paramdb_types::Value;
use serde::{Deserialize, Serialize};

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

///
/// Snapshot
///
/// Explicit, versioned point-in-time capture of a container's persisted
/// values, ordered by the composed schema's declaration order. Only fields
/// with `persist=true` ever appear here.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Snapshot {
    pub version: u8,
    pub entries: Vec<SnapshotEntry>,
}

///
/// SnapshotEntry
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SnapshotEntry {
    pub name: String,
    pub value: Value,
}

impl Snapshot {
    #[must_use]
    pub fn new(entries: Vec<SnapshotEntry>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            entries,
        }
    }

    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.value)
    }
}
