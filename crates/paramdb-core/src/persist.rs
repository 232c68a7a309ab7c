//! Pack/unpack surface for the external durable-storage writer.
//!
//! The writer decides *which* definitions to flush via
//! `Registry::to_persist_list(mask)`; these helpers decide *how* each value
//! crosses the storage boundary, honoring per-definition codecs.

use paramdb_schema::ParamDef;
use paramdb_types::{CodecError, Packed, Value};
use std::collections::BTreeMap;

/// Current pack format version, passed back to codecs on read.
pub const PACK_VERSION: u8 = 1;

/// Storage-ready representation of one value. Codec-less definitions pass
/// through unchanged; they must already be representable natively.
pub fn pack_param(def: &ParamDef, value: &Value) -> Result<Packed, CodecError> {
    match def.codec() {
        Some(codec) => codec.pack(value),
        None => Ok(Packed::new(value.clone())),
    }
}

/// Reverse of [`pack_param`] for values read back from storage.
pub fn unpack_param(
    def: &ParamDef,
    raw: Value,
    version: u8,
    attrs: &BTreeMap<String, String>,
) -> Result<Value, CodecError> {
    match def.codec() {
        Some(codec) => codec.unpack(raw, version, attrs),
        None => Ok(raw),
    }
}
