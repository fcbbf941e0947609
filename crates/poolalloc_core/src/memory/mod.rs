//! # Memory Management
//!
//! One pre-sized pool per allocator, carved into fixed-stride chunks.
//!
//! ## Design Philosophy
//!
//! The pool is mapped once, on first use, and unmapped once:
//! - No growth, no second pool
//! - No free list: every allocation scans from the pool base
//! - Chunks are named by offset handles, never raw pointers

mod chunk;
mod pool;
mod region;

pub use chunk::{ChunkInfo, ChunkLayout, ChunkPtr, HEADER_SIZE};
pub use pool::PoolAllocator;
