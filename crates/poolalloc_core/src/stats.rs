//! # Pool Statistics
//!
//! Plain counters updated by the allocator. Reading them is free; nothing is
//! printed unless a `tracing` subscriber is installed.

/// Per-allocator counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Successful pool reservations (0 or 1 for a live allocator).
    pub reservations: u64,
    /// Successful `allocate` calls.
    pub allocations: u64,
    /// Successful `deallocate` calls.
    pub deallocations: u64,
    /// Deallocations that returned a chunk to the free state.
    pub chunks_freed: u64,
    /// Chunk headers inspected by allocation scans.
    pub chunks_scanned: u64,
    /// `allocate` calls that returned an error.
    pub failed_allocations: u64,
    /// `deallocate` calls rejected as precondition violations.
    pub rejected_frees: u64,
}

impl PoolStats {
    /// Chunks claimed and not yet returned to the free state.
    #[inline]
    #[must_use]
    pub const fn outstanding(&self) -> u64 {
        self.allocations.saturating_sub(self.chunks_freed)
    }

    /// Average headers inspected per successful allocation.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_scan_length(&self) -> f64 {
        if self.allocations == 0 {
            return 0.0;
        }
        self.chunks_scanned as f64 / self.allocations as f64
    }
}
