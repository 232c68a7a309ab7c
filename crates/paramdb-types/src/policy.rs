use crate::value::Value;
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;

///
/// SetterError
///
/// Failure raised by a custom setter while validating or deriving writes.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("setter rejected value: {reason}")]
pub struct SetterError {
    pub reason: String,
}

impl SetterError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Custom setter hook. Receives the incoming value and returns the full list
/// of `(name, value)` writes to apply: the target field itself plus any
/// derived fields. Writes land through the container's normal stamping path.
pub type SetterFn = Arc<dyn Fn(Value) -> Result<Vec<(String, Value)>, SetterError> + Send + Sync>;

///
/// SetterPolicy
///
/// Access policy enforced on every write to a parameter.
///

#[derive(Clone, Default)]
pub enum SetterPolicy {
    /// Store the value as-is.
    #[default]
    Unrestricted,
    /// Route the write through a caller-supplied hook.
    Custom(SetterFn),
    /// The field only ever holds its definition-time default.
    Frozen,
}

impl SetterPolicy {
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        matches!(self, Self::Frozen)
    }
}

impl fmt::Debug for SetterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrestricted => write!(f, "Unrestricted"),
            Self::Custom(_) => write!(f, "Custom(..)"),
            Self::Frozen => write!(f, "Frozen"),
        }
    }
}
