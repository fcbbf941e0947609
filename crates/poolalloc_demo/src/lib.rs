//! # POOLALLOC Demo
//!
//! An external consumer of `poolalloc_core`. It only uses the public
//! allocator contract: a forward list asks for storage through
//! [`ChunkAllocator`](poolalloc_core::ChunkAllocator) and rebinds the
//! element allocator to its node type.
//!
//! ## Example
//!
//! ```rust
//! use poolalloc_core::PoolAllocator;
//! use poolalloc_demo::{InlineStr, PoolList};
//!
//! let alloc: PoolAllocator<InlineStr> = PoolAllocator::new();
//! let mut list: PoolList<InlineStr, _> = PoolList::new_in(&alloc);
//! list.push_front(InlineStr::new("29").unwrap())?;
//! assert_eq!(list.front()?.unwrap(), "29");
//! # Ok::<(), poolalloc_core::PoolError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod inline_str;
pub mod list;

pub use inline_str::{InlineStr, InlineStrError, INLINE_CAPACITY};
pub use list::{Iter, Node, PoolList};
