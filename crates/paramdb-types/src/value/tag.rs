use derive_more::Display;

///
/// ValueTag
///
/// Stable value-variant tag used in definition and usage error messages.
///

#[repr(u8)]
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[remain::sorted]
pub enum ValueTag {
    Blob,
    Bool,
    Float,
    Int,
    List,
    Map,
    Null,
    Text,
}

impl ValueTag {
    /// Human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blob => "Blob",
            Self::Bool => "Bool",
            Self::Float => "Float",
            Self::Int => "Int",
            Self::List => "List",
            Self::Map => "Map",
            Self::Null => "Null",
            Self::Text => "Text",
        }
    }
}
