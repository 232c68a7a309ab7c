use paramdb_types::ValueTag;
use std::{collections::BTreeMap, fmt};
use thiserror::Error as ThisError;

///
/// DefinitionError
///
/// Schema-build-time failures. All of these are programming errors in the
/// contributing plugin and must surface before any simulation work starts.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum DefinitionError {
    #[error("parameter '{name}' already defined in ancestry of kind '{kind}'")]
    AncestorCollision { kind: String, name: String },

    #[error("cannot contribute to kind '{kind}': its schema is already composed")]
    ComposedKind { kind: String },

    #[error("ancestry of kind '{kind}' is cyclic")]
    CyclicAncestry { kind: String },

    #[error("kind '{kind}' is already declared")]
    DuplicateKind { kind: String },

    #[error("parameter '{name}' is already defined for kind '{owner}'")]
    DuplicateParam { owner: String, name: String },

    #[error("invalid identifier '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("registry is locked; no further definitions are accepted")]
    LockedRegistry,

    #[error(
        "kind '{kind}' requests multiple ancestors, but the exception is already taken by '{taken_by}'"
    )]
    MultiAncestorExhausted { kind: String, taken_by: String },

    #[error("default for parameter '{name}' is a mutable {tag} and would be shared across instances")]
    MutableDefault { name: String, tag: ValueTag },

    #[error("parameter '{name}' is owned by kind '{owner}', not '{kind}'")]
    OwnerMismatch {
        kind: String,
        owner: String,
        name: String,
    },

    #[error("parameter '{name}' declares a codec but persist=false; codecs only apply to persisted values")]
    TransientCodec { name: String },

    #[error("unknown kind '{kind}'")]
    UnknownKind { kind: String },
}

///
/// ErrorTree
///
/// Route-aware aggregation of definition errors, so one validation pass can
/// report every offending kind at once instead of stopping at the first.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorTree {
    errors: Vec<String>,
    routes: BTreeMap<String, Vec<String>>,
}

impl ErrorTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error with no route context.
    pub fn add(&mut self, err: impl fmt::Display) {
        self.errors.push(err.to_string());
    }

    /// Record an error against a route (a kind name or tree path).
    pub fn add_at(&mut self, route: impl Into<String>, err: impl fmt::Display) {
        self.routes.entry(route.into()).or_default().push(err.to_string());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.routes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len() + self.routes.values().map(Vec::len).sum::<usize>()
    }

    /// Resolve to `Err(self)` when any error was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut write_one = |f: &mut fmt::Formatter<'_>, line: &str| -> fmt::Result {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{line}")
        };

        for err in &self.errors {
            write_one(f, err)?;
        }
        for (route, errs) in &self.routes {
            for err in errs {
                write_one(f, &format!("{route}: {err}"))?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for ErrorTree {}

/// Record a formatted error into an [`ErrorTree`].
#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {
        $errs.add(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::ErrorTree;

    #[test]
    fn empty_tree_resolves_ok() {
        assert!(ErrorTree::new().result().is_ok());
    }

    #[test]
    fn display_includes_routes() {
        let mut errs = ErrorTree::new();
        err!(errs, "bad {} thing", "first");
        errs.add_at("block", "duplicate parameter 'mass'");

        assert_eq!(errs.len(), 2);
        let text = errs.to_string();
        assert!(text.contains("bad first thing"));
        assert!(text.contains("block: duplicate parameter 'mass'"));
    }
}
