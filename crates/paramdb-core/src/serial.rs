use std::sync::atomic::{AtomicU64, Ordering};

///
/// SerialAllocator
///
/// Process-local source of container serial numbers. Explicitly owned and
/// injected into the factory rather than hidden in a global; serials are
/// unique and monotone within one process, never across processes.
///

#[derive(Debug)]
pub struct SerialAllocator {
    next: AtomicU64,
}

impl SerialAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Hand out the next serial number.
    pub fn allocate(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Serials handed out so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

impl Default for SerialAllocator {
    fn default() -> Self {
        Self::new()
    }
}
