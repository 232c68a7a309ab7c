use crate::{state::SnapshotError, sync::SyncError};
use paramdb_schema::DefinitionError;
use paramdb_types::SetterError;
use thiserror::Error as ThisError;

///
/// UsageError
///
/// Run-time misuse of a state container. Unlike definition errors these can
/// legitimately occur during a simulation; all are surfaced to the caller,
/// never silently ignored.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum UsageError {
    #[error("no value assigned to '{name}' and no default was declared")]
    NoValue { name: String },

    #[error("container {serial} is read-only")]
    ReadOnly { serial: u64 },

    #[error("parameter '{name}' has a restricted setter and cannot be written")]
    RestrictedWrite { name: String },

    #[error("custom setter for '{name}' failed: {source}")]
    Setter {
        name: String,
        #[source]
        source: SetterError,
    },

    #[error("unknown parameter '{name}' for kind '{kind}'")]
    UnknownParam { kind: String, name: String },
}

///
/// Error
///
/// Top-level runtime error for the engine.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Usage(#[from] UsageError),
}
