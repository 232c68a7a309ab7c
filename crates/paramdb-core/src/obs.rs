//! Sync-round tracing boundary.
//!
//! Tracing is optional, injected by the caller, and must not affect round
//! semantics. Engine logic never depends on a concrete sink.

///
/// SyncTraceSink
///

pub trait SyncTraceSink: Send + Sync {
    fn on_event(&self, event: SyncTraceEvent);
}

///
/// SyncTraceEvent
///

#[derive(Clone, Copy, Debug)]
pub enum SyncTraceEvent<'a> {
    /// A sync round began on this process.
    RoundStart { rank: usize, containers: usize },
    /// The gather phase finished; `deltas` containers were locally dirty.
    Gathered { rank: usize, deltas: usize },
    /// One foreign delta was applied.
    Applied { container: &'a str, fields: usize },
    /// Disagreeing concurrent writes were detected; the round aborts.
    Conflict { container: &'a str, field: &'a str },
    /// The round completed successfully.
    RoundFinish { applied: usize },
}

///
/// NoopTraceSink
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTraceSink;

impl SyncTraceSink for NoopTraceSink {
    fn on_event(&self, _event: SyncTraceEvent) {}
}
