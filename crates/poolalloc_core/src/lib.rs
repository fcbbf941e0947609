//! # POOLALLOC Core
//!
//! Fixed-capacity memory pool allocator:
//! - One region per allocator, mapped from the OS on first use
//! - Fixed-stride chunks, each a small header plus one element's payload
//! - Linear-scan allocation, in-place deallocation, rebind to sibling types
//!
//! ## Architecture Rules
//!
//! 1. **Capacity is fixed** - `chunk_count * stride` bytes, never grown
//! 2. **No unsafe** - chunks are addressed by offset handles ([`ChunkPtr`])
//! 3. **Misuse is reported** - foreign handles, double frees and oversized
//!    frees come back as [`PoolError`]s while the chunk is still free.
//!    Handles carry no generation, so a stale handle to a chunk that has
//!    since been claimed again is indistinguishable from the new claim
//!
//! ## Example
//!
//! ```rust
//! use poolalloc_core::{PoolAllocator, PoolConfig};
//!
//! let config = PoolConfig::from_toml_str("chunk_count = 64")?;
//! let mut names: PoolAllocator<[u8; 24]> = PoolAllocator::with_config(config)?;
//!
//! let ptr = names.allocate(24)?;
//! names.payload_mut(ptr)?[..5].copy_from_slice(b"hello");
//! names.deallocate(ptr, 24)?;
//!
//! // Sibling allocator for another type: same recipe, its own pool
//! let nodes: PoolAllocator<[u8; 40]> = names.rebind();
//! assert!(!nodes.is_reserved());
//! # Ok::<(), poolalloc_core::PoolError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod capability;
pub mod config;
pub mod error;
pub mod memory;
pub mod stats;

pub use capability::ChunkAllocator;
pub use config::{PoolConfig, DEFAULT_CHUNK_COUNT};
pub use error::{PoolError, PoolResult};
pub use memory::{ChunkInfo, ChunkLayout, ChunkPtr, PoolAllocator, HEADER_SIZE};
pub use stats::PoolStats;
