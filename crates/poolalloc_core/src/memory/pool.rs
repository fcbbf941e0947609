//! # Pool Allocator
//!
//! Fixed-capacity allocator that carves one lazily reserved region into
//! fixed-stride chunks and hands them out by linear scan.

use super::chunk::{ChunkHeader, ChunkInfo, ChunkLayout, ChunkPtr};
use super::region::PoolRegion;
use crate::capability::ChunkAllocator;
use crate::config::PoolConfig;
use crate::error::{PoolError, PoolResult};
use crate::stats::PoolStats;
use std::fmt;
use std::marker::PhantomData;

/// A pool allocator for elements of type `T`.
///
/// The pool is `chunk_count` chunks of `ChunkLayout::of::<T>().stride()`
/// bytes, mapped from the OS on the first `allocate` and unmapped when the
/// allocator is dropped. Capacity never changes in between.
///
/// `allocate` scans from the pool base every time and claims the first free
/// chunk; `deallocate` returns bytes to the chunk in place. There is no free
/// list, no coalescing and no growth.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. Mutation takes `&mut self`, so sharing one
/// allocator between threads requires external locking.
///
/// # Example
///
/// ```rust
/// use poolalloc_core::PoolAllocator;
///
/// let mut pool: PoolAllocator<u64> = PoolAllocator::new();
/// assert!(!pool.is_reserved());
///
/// let ptr = pool.allocate(8)?;
/// pool.payload_mut(ptr)?.copy_from_slice(&42u64.to_le_bytes());
/// pool.deallocate(ptr, 8)?;
/// # Ok::<(), poolalloc_core::PoolError>(())
/// ```
pub struct PoolAllocator<T> {
    /// Chunk count, shared with rebound siblings.
    config: PoolConfig,
    /// Chunk layout for `T`.
    layout: ChunkLayout,
    /// The pool, once reserved.
    pool: Option<PoolRegion>,
    /// Counters.
    stats: PoolStats,
    /// Marker for T.
    _phantom: PhantomData<fn() -> T>,
}

impl<T> PoolAllocator<T> {
    /// Creates an allocator for the default 4096-chunk pool.
    ///
    /// No memory is reserved until the first allocation.
    #[must_use]
    pub const fn new() -> Self {
        Self::from_config(PoolConfig::with_chunk_count(crate::config::DEFAULT_CHUNK_COUNT))
    }

    /// Creates an allocator with a configured chunk count.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the chunk count is zero or the
    /// pool size does not fit in `usize`.
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;

        let stride = ChunkLayout::of::<T>().stride();
        if config.chunk_count.checked_mul(stride).is_none() {
            return Err(PoolError::InvalidConfig(format!(
                "{} chunks of {stride} bytes overflow the address space",
                config.chunk_count
            )));
        }

        Ok(Self::from_config(config))
    }

    const fn from_config(config: PoolConfig) -> Self {
        Self {
            config,
            layout: ChunkLayout::of::<T>(),
            pool: None,
            stats: PoolStats {
                reservations: 0,
                allocations: 0,
                deallocations: 0,
                chunks_freed: 0,
                chunks_scanned: 0,
                failed_allocations: 0,
                rejected_frees: 0,
            },
            _phantom: PhantomData,
        }
    }

    /// Builds an allocator for another element type from the same recipe.
    ///
    /// The result has no pool. It reserves its own on first use, sized by
    /// its own stride; pool memory is never shared between allocators.
    #[must_use]
    pub const fn rebind<U>(&self) -> PoolAllocator<U> {
        PoolAllocator::from_config(self.config)
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> PoolConfig {
        self.config
    }

    /// Returns the chunk layout for `T`.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> ChunkLayout {
        self.layout
    }

    /// Returns the chunk stride in bytes.
    #[inline]
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.layout.stride()
    }

    /// Returns the number of chunks in the pool.
    #[inline]
    #[must_use]
    pub const fn chunk_count(&self) -> usize {
        self.config.chunk_count
    }

    /// Returns the total pool capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.config.chunk_count.saturating_mul(self.layout.stride())
    }

    /// Whether the pool has been reserved.
    #[inline]
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        self.pool.is_some()
    }

    /// Address of the pool's first byte, if reserved.
    #[inline]
    #[must_use]
    pub fn base_addr(&self) -> Option<usize> {
        self.pool.as_ref().map(PoolRegion::base_addr)
    }

    /// Identity stamped into this pool's handles, if reserved.
    #[inline]
    #[must_use]
    pub fn pool_id(&self) -> Option<u64> {
        self.pool.as_ref().map(PoolRegion::id)
    }

    /// Returns the counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Claims room for `bytes` bytes and returns a handle to the payload.
    ///
    /// Reserves the pool on first use, then scans from the pool base and
    /// claims the first free chunk. Requests larger than one payload claim
    /// a run of consecutive free chunks.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ZeroSizedRequest`] if `bytes` is zero.
    /// - [`PoolError::CapacityExceeded`] if `bytes` exceeds the pool capacity.
    /// - [`PoolError::OutOfMemory`] if the pool cannot be reserved.
    /// - [`PoolError::PoolExhausted`] if the scan reaches the pool end.
    pub fn allocate(&mut self, bytes: usize) -> PoolResult<ChunkPtr> {
        let result = self.claim(bytes);
        if result.is_err() {
            self.stats.failed_allocations += 1;
        }
        result
    }

    fn claim(&mut self, bytes: usize) -> PoolResult<ChunkPtr> {
        if bytes == 0 {
            return Err(PoolError::ZeroSizedRequest);
        }

        let capacity = self.capacity();
        if bytes > capacity {
            return Err(PoolError::CapacityExceeded {
                requested: bytes,
                capacity,
            });
        }

        let region = match self.pool.take() {
            Some(region) => region,
            None => self.reserve_pool()?,
        };
        let region = self.pool.insert(region);

        let layout = self.layout;
        let (start, scanned) = find_free(region, layout, bytes, self.config.chunk_count)?;

        let mut header = region.header(start);
        header.claim(bytes);
        region.write_header(start, header);
        let ptr = ChunkPtr::new(region.id(), start + layout.payload_offset());

        self.stats.allocations += 1;
        self.stats.chunks_scanned += scanned;
        tracing::debug!(%ptr, bytes, scanned, "chunk claimed");

        Ok(ptr)
    }

    fn reserve_pool(&mut self) -> PoolResult<PoolRegion> {
        let bytes = self.capacity();
        match PoolRegion::reserve(bytes) {
            Ok(region) => {
                self.stats.reservations += 1;
                tracing::info!(
                    bytes,
                    chunks = self.config.chunk_count,
                    stride = self.layout.stride(),
                    "memory pool reserved at {:#x}",
                    region.base_addr()
                );
                Ok(region)
            }
            Err(err) => {
                tracing::warn!("memory pool reservation failed: {err}");
                Err(err)
            }
        }
    }

    /// Returns `bytes` bytes of the claim at `ptr` to the pool.
    ///
    /// The chunk becomes free again once all of its claimed bytes have been
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ForeignPointer`] if `ptr` was not issued by this pool.
    /// - [`PoolError::NotAllocated`] if the chunk is already free.
    /// - [`PoolError::OversizedFree`] if `bytes` exceeds the bytes in use.
    ///
    /// A rejected call leaves the pool unchanged.
    pub fn deallocate(&mut self, ptr: ChunkPtr, bytes: usize) -> PoolResult<()> {
        let result = self.release(ptr, bytes);
        if let Err(err) = &result {
            self.stats.rejected_frees += 1;
            tracing::warn!("rejected free: {err}");
        }
        result
    }

    fn release(&mut self, ptr: ChunkPtr, bytes: usize) -> PoolResult<()> {
        let layout = self.layout;
        let region = self
            .pool
            .as_mut()
            .ok_or(PoolError::ForeignPointer { ptr })?;
        let start = region.chunk_start(layout, ptr)?;

        let mut header = region.header(start);
        if !header.is_allocated() {
            return Err(PoolError::NotAllocated { ptr });
        }
        let in_use = header.bytes_in_use();
        if bytes > in_use {
            return Err(PoolError::OversizedFree {
                ptr,
                requested: bytes,
                in_use,
            });
        }

        let freed = header.release(bytes);
        region.write_header(start, header);

        // Chunks the shrunken claim no longer covers hold stale payload bytes
        let kept = start + layout.span(header.bytes_in_use());
        let covered = start + layout.span(in_use);
        for uncovered in (kept..covered).step_by(layout.stride()) {
            region.write_header(uncovered, ChunkHeader::default());
        }

        self.stats.deallocations += 1;
        if freed {
            self.stats.chunks_freed += 1;
        }
        tracing::debug!(%ptr, bytes, freed, "chunk released");

        Ok(())
    }

    /// The claimed bytes behind a live handle.
    ///
    /// # Errors
    ///
    /// [`PoolError::ForeignPointer`] or [`PoolError::NotAllocated`], as for
    /// [`PoolAllocator::deallocate`].
    pub fn payload(&self, ptr: ChunkPtr) -> PoolResult<&[u8]> {
        let region = self
            .pool
            .as_ref()
            .ok_or(PoolError::ForeignPointer { ptr })?;
        let len = claimed_len(region, self.layout, ptr)?;
        Ok(region.bytes(ptr.offset(), len))
    }

    /// The claimed bytes behind a live handle, mutably.
    ///
    /// # Errors
    ///
    /// [`PoolError::ForeignPointer`] or [`PoolError::NotAllocated`], as for
    /// [`PoolAllocator::deallocate`].
    pub fn payload_mut(&mut self, ptr: ChunkPtr) -> PoolResult<&mut [u8]> {
        let region = self
            .pool
            .as_mut()
            .ok_or(PoolError::ForeignPointer { ptr })?;
        let len = claimed_len(region, self.layout, ptr)?;
        Ok(region.bytes_mut(ptr.offset(), len))
    }

    /// Index of the chunk a handle points into, counted from the pool base.
    ///
    /// # Errors
    ///
    /// [`PoolError::ForeignPointer`] if `ptr` was not issued by this pool.
    pub fn chunk_index(&self, ptr: ChunkPtr) -> PoolResult<usize> {
        let region = self
            .pool
            .as_ref()
            .ok_or(PoolError::ForeignPointer { ptr })?;
        Ok(region.chunk_start(self.layout, ptr)? / self.layout.stride())
    }

    /// Header snapshot of chunk `index`.
    ///
    /// None if the pool is unreserved, `index` is out of range, or the chunk
    /// lies inside a multi-chunk claim.
    #[must_use]
    pub fn chunk(&self, index: usize) -> Option<ChunkInfo> {
        self.chunks()
            .take_while(|chunk| chunk.index <= index)
            .find(|chunk| chunk.index == index)
    }

    /// Iterates over chunk headers in address order, walking the pool the
    /// way the allocation scan does.
    ///
    /// Chunks covered by a multi-chunk claim carry no header of their own
    /// and are skipped. Empty while the pool is unreserved.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkInfo> + '_ {
        let stride = self.layout.stride();
        self.pool
            .iter()
            .flat_map(move |region| region.heads(self.layout))
            .map(move |(start, header)| ChunkInfo {
                index: start / stride,
                allocated: header.is_allocated(),
                bytes_in_use: header.bytes_in_use(),
            })
    }

    /// Number of chunks currently claimed.
    #[must_use]
    pub fn live_chunks(&self) -> usize {
        self.chunks().filter(|chunk| chunk.allocated).count()
    }
}

/// Linear scan from the pool base for room to hold `bytes`.
///
/// Returns the start of the first free chunk whose span fits, and the number
/// of headers inspected. Skip distances come from each visited header.
fn find_free(
    region: &PoolRegion,
    layout: ChunkLayout,
    bytes: usize,
    chunk_count: usize,
) -> PoolResult<(usize, u64)> {
    let end = region.len();
    let claim = layout.span(bytes);
    let mut cursor = 0;
    let mut scanned = 0;

    loop {
        scanned += 1;
        let header = region.header(cursor);

        let skip = if header.is_allocated() {
            layout.span(header.bytes_in_use())
        } else if span_is_free(region, layout, cursor, claim) {
            return Ok((cursor, scanned));
        } else {
            layout.stride()
        };

        cursor = cursor.saturating_add(skip);
        if cursor >= end {
            return Err(PoolError::PoolExhausted {
                requested: bytes,
                chunk_count,
            });
        }
    }
}

/// Whether `claim` bytes starting at the free chunk `start` stay inside the
/// pool and cover no claimed chunk.
fn span_is_free(region: &PoolRegion, layout: ChunkLayout, start: usize, claim: usize) -> bool {
    let Some(span_end) = start.checked_add(claim) else {
        return false;
    };
    if span_end > region.len() {
        return false;
    }

    (start + layout.stride()..span_end)
        .step_by(layout.stride())
        .all(|next| !region.header(next).is_allocated())
}

/// Bytes in use behind a live handle.
fn claimed_len(region: &PoolRegion, layout: ChunkLayout, ptr: ChunkPtr) -> PoolResult<usize> {
    let start = region.chunk_start(layout, ptr)?;
    let header = region.header(start);
    if !header.is_allocated() {
        return Err(PoolError::NotAllocated { ptr });
    }
    Ok(header.bytes_in_use())
}

impl<T> Default for PoolAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloning copies the recipe, never the pool.
impl<T> Clone for PoolAllocator<T> {
    fn clone(&self) -> Self {
        self.rebind()
    }
}

impl<T> Drop for PoolAllocator<T> {
    fn drop(&mut self) {
        if let Some(region) = self.pool.take() {
            tracing::info!(
                bytes = region.len(),
                "memory pool released at {:#x}",
                region.base_addr()
            );
        }
    }
}

impl<T> fmt::Debug for PoolAllocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("element", &std::any::type_name::<T>())
            .field("config", &self.config)
            .field("layout", &self.layout)
            .field("base_addr", &self.base_addr())
            .field("stats", &self.stats)
            .finish()
    }
}

impl<T> ChunkAllocator for PoolAllocator<T> {
    type Rebind<U> = PoolAllocator<U>;

    fn allocate(&mut self, bytes: usize) -> PoolResult<ChunkPtr> {
        PoolAllocator::allocate(self, bytes)
    }

    fn deallocate(&mut self, ptr: ChunkPtr, bytes: usize) -> PoolResult<()> {
        PoolAllocator::deallocate(self, ptr, bytes)
    }

    fn rebind<U>(&self) -> Self::Rebind<U> {
        PoolAllocator::rebind(self)
    }

    fn payload(&self, ptr: ChunkPtr) -> PoolResult<&[u8]> {
        PoolAllocator::payload(self, ptr)
    }

    fn payload_mut(&mut self, ptr: ChunkPtr) -> PoolResult<&mut [u8]> {
        PoolAllocator::payload_mut(self, ptr)
    }
}
