//! Facade crate for the paramdb engine.
//!
//! ## Crate layout
//! - `types`: runtime value model, change/location flag sets, setter
//!   policies, and the pack/unpack codec contract.
//! - `schema`: parameter definitions, per-kind registries, and the
//!   composer that assembles ancestry chains into composed schemas.
//! - `core`: per-instance state containers, backup/restore, persistence
//!   packing, and the inter-process sync engine.
//!
//! The `prelude` module mirrors the runtime surface most callers need.

pub use paramdb_core as core;
pub use paramdb_schema as schema;
pub use paramdb_types as types;

pub mod prelude {
    pub use paramdb_core::prelude::*;
}

/// Crate version of the facade, for embedding in diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
