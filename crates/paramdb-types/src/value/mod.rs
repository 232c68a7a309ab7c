mod tag;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// re-exports
pub use tag::ValueTag;

///
/// Value
///
/// Runtime parameter value. Every slot in a state container holds exactly one
/// of these; snapshots and sync deltas carry them losslessly through CBOR.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Stable variant tag for diagnostics and error messages.
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        match self {
            Self::Null => ValueTag::Null,
            Self::Bool(_) => ValueTag::Bool,
            Self::Int(_) => ValueTag::Int,
            Self::Float(_) => ValueTag::Float,
            Self::Text(_) => ValueTag::Text,
            Self::Blob(_) => ValueTag::Blob,
            Self::List(_) => ValueTag::List,
            Self::Map(_) => ValueTag::Map,
        }
    }

    /// A scalar value is safe to share as a definition-time default.
    ///
    /// `List` and `Map` are mutable aggregates; using one as a default would
    /// alias the same collection across every instance of the owning kind.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Map(_))
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}
