//! # Chunk Layout
//!
//! A chunk is a fixed-stride slot in the pool:
//!
//! ```text
//! | ChunkHeader (16 bytes) | pad to align_of::<T>() | payload: size_of::<T>() | pad to stride |
//! ^ chunk start            ^ payload offset
//! ```
//!
//! Chunks are addressed purely by byte offset from the pool base. The header
//! sits at a constant distance before the payload, so a payload offset is
//! enough to find its header again.

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Size of the per-chunk header in bytes.
pub const HEADER_SIZE: usize = std::mem::size_of::<ChunkHeader>();

/// Per-chunk bookkeeping stored in front of every payload.
///
/// Invariant: `bytes_in_use == 0` if and only if the chunk is free.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub(crate) struct ChunkHeader {
    /// Payload bytes claimed by the consumer.
    bytes_in_use: u64,
    /// 1 while the chunk is claimed.
    allocated: u32,
    /// Keeps the record free of implicit padding.
    reserved: u32,
}

impl ChunkHeader {
    /// Whether the chunk is currently claimed.
    #[inline]
    pub(crate) const fn is_allocated(&self) -> bool {
        self.allocated != 0
    }

    /// Payload bytes currently claimed.
    #[inline]
    pub(crate) fn bytes_in_use(&self) -> usize {
        usize::try_from(self.bytes_in_use).unwrap_or(usize::MAX)
    }

    /// Claims the chunk for `bytes` payload bytes.
    #[inline]
    pub(crate) fn claim(&mut self, bytes: usize) {
        self.allocated = 1;
        self.bytes_in_use = u64::try_from(bytes).unwrap_or(u64::MAX);
    }

    /// Releases `bytes` from the claim. Returns true if the chunk became free.
    ///
    /// The caller checks `bytes <= bytes_in_use()` first.
    #[inline]
    pub(crate) fn release(&mut self, bytes: usize) -> bool {
        let bytes = u64::try_from(bytes).unwrap_or(u64::MAX);
        self.bytes_in_use = self.bytes_in_use.saturating_sub(bytes);
        if self.bytes_in_use == 0 {
            self.allocated = 0;
        }
        !self.is_allocated()
    }
}

/// Rounds `value` up to the next multiple of `multiple`.
#[inline]
const fn round_up(value: usize, multiple: usize) -> usize {
    value.div_ceil(multiple).saturating_mul(multiple)
}

/// Byte layout of one chunk for a given element type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkLayout {
    /// Offset of the payload from the chunk start.
    payload_offset: usize,
    /// Payload capacity: one element.
    payload_size: usize,
    /// Distance between consecutive chunk starts.
    stride: usize,
}

impl ChunkLayout {
    /// Computes the chunk layout for element type `T`.
    ///
    /// The stride is a multiple of both the header and the element alignment,
    /// so every chunk start and every payload in the pool stays aligned.
    #[must_use]
    pub const fn of<T>() -> Self {
        let header_align = std::mem::align_of::<ChunkHeader>();
        let elem_align = std::mem::align_of::<T>();
        let align = if elem_align > header_align {
            elem_align
        } else {
            header_align
        };

        let payload_offset = round_up(HEADER_SIZE, elem_align);
        let payload_size = std::mem::size_of::<T>();

        Self {
            payload_offset,
            payload_size,
            stride: round_up(payload_offset + payload_size, align),
        }
    }

    /// Distance between consecutive chunk starts, in bytes.
    #[inline]
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Offset of the payload from the chunk start, in bytes.
    #[inline]
    #[must_use]
    pub const fn payload_offset(&self) -> usize {
        self.payload_offset
    }

    /// Payload capacity of a single chunk, in bytes.
    #[inline]
    #[must_use]
    pub const fn payload_size(&self) -> usize {
        self.payload_size
    }

    /// Bytes covered by a claim of `bytes` payload bytes starting at a chunk.
    ///
    /// This is the header plus the payload, padded up to whole strides, and
    /// is also the distance the allocation scan skips over a claimed chunk.
    #[inline]
    #[must_use]
    pub const fn span(&self, bytes: usize) -> usize {
        round_up(self.payload_offset.saturating_add(bytes), self.stride)
    }
}

/// Handle to a claimed chunk payload.
///
/// A `ChunkPtr` is the pool identity plus the payload's byte offset from the
/// pool base. It is plain data: it can be copied freely and stored inside
/// other chunks, but it only grants access through the allocator that
/// returned it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct ChunkPtr {
    /// Identity of the pool reservation that produced this handle.
    pool: u64,
    /// Payload offset from the pool base.
    offset: u64,
}

impl ChunkPtr {
    /// A handle that never names a live chunk. Equal to the all-zero value.
    pub const DANGLING: Self = Self { pool: 0, offset: 0 };

    #[inline]
    pub(crate) fn new(pool: u64, offset: usize) -> Self {
        Self {
            pool,
            offset: u64::try_from(offset).unwrap_or(u64::MAX),
        }
    }

    /// Returns true for [`ChunkPtr::DANGLING`].
    #[inline]
    #[must_use]
    pub const fn is_dangling(&self) -> bool {
        self.pool == 0
    }

    /// Identity of the pool reservation this handle belongs to.
    #[inline]
    #[must_use]
    pub const fn pool_id(&self) -> u64 {
        self.pool
    }

    /// Payload offset from the pool base, in bytes.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        usize::try_from(self.offset).unwrap_or(usize::MAX)
    }
}

impl fmt::Display for ChunkPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:#x}", self.pool, self.offset)
    }
}

/// Snapshot of one chunk's header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkInfo {
    /// Chunk index from the pool base.
    pub index: usize,
    /// Whether the chunk is claimed.
    pub allocated: bool,
    /// Payload bytes claimed.
    pub bytes_in_use: usize,
}
