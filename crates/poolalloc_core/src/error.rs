//! # Pool Error Types
//!
//! All errors that can occur while reserving, claiming or releasing pool memory.

use crate::memory::ChunkPtr;
use thiserror::Error;

/// Errors that can occur in the pool allocator.
///
/// Every variant is final for the request that produced it. Nothing is
/// retried internally; callers retry by changing the request size or by
/// using a fresh allocator.
#[derive(Error, Debug)]
pub enum PoolError {
    /// The operating system refused to map the pool region.
    #[error("failed to reserve {bytes} bytes for the memory pool: {source}")]
    OutOfMemory {
        /// Size of the mapping that was requested.
        bytes: usize,
        /// Error reported by the mapping call.
        #[source]
        source: std::io::Error,
    },

    /// A single request is larger than the whole pool.
    #[error("cannot allocate {requested} bytes: pool capacity is {capacity} bytes")]
    CapacityExceeded {
        /// Bytes requested.
        requested: usize,
        /// Total pool capacity in bytes.
        capacity: usize,
    },

    /// The scan reached the end of the pool without finding room.
    #[error("memory pool exhausted: no room for {requested} bytes in {chunk_count} chunks")]
    PoolExhausted {
        /// Bytes requested.
        requested: usize,
        /// Number of chunks in the pool.
        chunk_count: usize,
    },

    /// `allocate(0)` would leave an allocated chunk with zero bytes in use.
    #[error("zero-sized allocation requested")]
    ZeroSizedRequest,

    /// The handle does not name a chunk payload of this pool.
    #[error("pointer {ptr} does not belong to this pool")]
    ForeignPointer {
        /// The rejected handle.
        ptr: ChunkPtr,
    },

    /// The chunk behind the handle is free, or lies inside another live
    /// claim (double free or use after free).
    ///
    /// Only detected until the chunk is claimed again: handles carry no
    /// generation, so a stale handle to a reclaimed chunk names the new claim.
    #[error("chunk at {ptr} is not allocated")]
    NotAllocated {
        /// The rejected handle.
        ptr: ChunkPtr,
    },

    /// Attempted to release more bytes than the chunk holds.
    #[error("cannot free {requested} bytes at {ptr}: only {in_use} bytes in use")]
    OversizedFree {
        /// The chunk handle.
        ptr: ChunkPtr,
        /// Bytes the caller tried to release.
        requested: usize,
        /// Bytes currently claimed in the chunk.
        in_use: usize,
    },

    /// Typed access wants more bytes than the claim holds.
    #[error("payload at {ptr} holds {available} bytes, {requested} requested")]
    PayloadTooSmall {
        /// The chunk handle.
        ptr: ChunkPtr,
        /// Bytes needed by the access.
        requested: usize,
        /// Bytes claimed in the chunk.
        available: usize,
    },

    /// Invalid pool configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
