//! Runtime of the paramdb engine: per-instance state containers bound to
//! composed schemas, change tracking, nested backup/restore, the persist
//! surface for durable-storage writers, and the distributed-state sync
//! protocol behind a transport trait.

pub mod error;
pub mod factory;
pub mod obs;
pub mod persist;
pub mod serial;
pub mod serialize;
pub mod state;
pub mod sync;

// re-exports
pub use error::{Error, UsageError};
pub use factory::ParamFactory;
pub use serial::SerialAllocator;
pub use state::{ParamSet, SnapshotError};
pub use sync::{ContainerDelta, SyncError, SyncReport, SyncTransport, sync_round};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        error::{Error, UsageError},
        factory::ParamFactory,
        obs::{NoopTraceSink, SyncTraceSink},
        serial::SerialAllocator,
        state::ParamSet,
        sync::{ContainerDelta, SyncError, SyncTransport, sync_round},
    };
    pub use paramdb_schema::prelude::*;
}
