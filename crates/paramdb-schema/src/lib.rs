//! Schema layer of the paramdb engine: parameter definitions, the lockable
//! ordered registry, and the composer that builds one shared schema per node
//! kind from independently contributed fragments.

pub mod build;
pub mod def;
pub mod error;
pub mod registry;
pub mod validate;

use thiserror::Error as ThisError;

/// Maximum length for node-kind identifiers.
pub const MAX_KIND_NAME_LEN: usize = 64;

/// Maximum length for parameter identifiers.
pub const MAX_PARAM_NAME_LEN: usize = 64;

// re-exports
pub use build::Composer;
pub use def::{ParamDef, ParamDefBuilder};
pub use error::{DefinitionError, ErrorTree};
pub use registry::Registry;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        build::Composer,
        def::{ParamDef, ParamDefBuilder},
        error::{DefinitionError, ErrorTree},
        registry::Registry,
    };
    pub use paramdb_types::{ChangeMask, Location, SetterPolicy, Value};
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("schema validation failed: {0}")]
    Validation(ErrorTree),
}
