//! Shared vocabulary for the paramdb engine: the runtime value model,
//! physical-location and change-tracking flag sets, setter policies, and the
//! pack/unpack codec contract used by durable-storage writers.

pub mod change;
pub mod codec;
pub mod location;
pub mod policy;
pub mod value;

// re-exports
pub use change::ChangeMask;
pub use codec::{CodecError, Packed, ValueCodec};
pub use location::Location;
pub use policy::{SetterError, SetterFn, SetterPolicy};
pub use value::{Value, ValueTag};
