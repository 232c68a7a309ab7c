use crate::value::{Value, ValueTag};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// CodecError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CodecError {
    #[error("cannot pack {tag} value: {reason}")]
    Pack { tag: ValueTag, reason: String },

    #[error("cannot unpack stored value (format version {version}): {reason}")]
    Unpack { version: u8, reason: String },
}

///
/// Packed
///
/// Storage-ready representation of one codec-handled value: a primitive
/// `Value` the storage format accepts natively plus free-form attributes the
/// codec needs to reverse the packing.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Packed {
    pub raw: Value,
    pub attrs: BTreeMap<String, String>,
}

impl Packed {
    #[must_use]
    pub fn new(raw: Value) -> Self {
        Self {
            raw,
            attrs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

///
/// ValueCodec
///
/// Pack/unpack strategy for persisted values that cannot round-trip through
/// the storage format natively. Contract: `unpack(pack(v)) == v` for every
/// legal `v`; version and attrs exist so a codec can migrate old layouts.
///

pub trait ValueCodec: Send + Sync {
    fn pack(&self, value: &Value) -> Result<Packed, CodecError>;

    fn unpack(
        &self,
        raw: Value,
        version: u8,
        attrs: &BTreeMap<String, String>,
    ) -> Result<Value, CodecError>;
}
