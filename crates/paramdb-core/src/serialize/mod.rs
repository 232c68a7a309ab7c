//! Snapshot (de)serialization boundary. CBOR with a bounded payload size and
//! panic-contained decoding.

mod cbor;

use thiserror::Error as ThisError;

pub(crate) use cbor::{deserialize, serialize};

/// Maximum accepted size for one snapshot blob.
pub const MAX_SNAPSHOT_BYTES: u32 = 4 * 1024 * 1024;

///
/// SerializeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SerializeError {
    #[error("serialize failed: {0}")]
    Serialize(String),

    #[error("deserialize failed: {0}")]
    Deserialize(String),
}
