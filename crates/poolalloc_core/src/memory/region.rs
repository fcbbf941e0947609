//! # Pool Region
//!
//! The single anonymous mapping backing one allocator. Reserved in one call,
//! unmapped in one call when dropped; never grown or shrunk in between.

use super::chunk::{ChunkHeader, ChunkLayout, ChunkPtr, HEADER_SIZE};
use crate::error::{PoolError, PoolResult};
use memmap2::MmapMut;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of pool identities. Zero is reserved for [`ChunkPtr::DANGLING`].
static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// A reserved pool: the mapping plus the identity stamped into its handles.
pub(crate) struct PoolRegion {
    /// Zero-initialized read/write anonymous mapping.
    map: MmapMut,
    /// Unique per reservation.
    id: u64,
}

impl PoolRegion {
    /// Maps `bytes` of zeroed memory and initializes the first chunk header.
    ///
    /// `bytes` must be a non-zero multiple of the chunk stride.
    pub(crate) fn reserve(bytes: usize) -> PoolResult<Self> {
        let map = MmapMut::map_anon(bytes)
            .map_err(|source| PoolError::OutOfMemory { bytes, source })?;

        let mut region = Self {
            map,
            id: NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed),
        };
        region.write_header(0, ChunkHeader::default());
        Ok(region)
    }

    /// Identity stamped into every handle from this region.
    #[inline]
    pub(crate) const fn id(&self) -> u64 {
        self.id
    }

    /// Total bytes in the region. The pool end is `base_addr() + len()`.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    /// Address of the first byte of the region.
    #[inline]
    pub(crate) fn base_addr(&self) -> usize {
        self.map.as_ptr() as usize
    }

    /// Reads the header of the chunk starting at `start`.
    #[inline]
    pub(crate) fn header(&self, start: usize) -> ChunkHeader {
        bytemuck::pod_read_unaligned(&self.map[start..start + HEADER_SIZE])
    }

    /// Overwrites the header of the chunk starting at `start`.
    #[inline]
    pub(crate) fn write_header(&mut self, start: usize, header: ChunkHeader) {
        self.map[start..start + HEADER_SIZE].copy_from_slice(bytemuck::bytes_of(&header));
    }

    /// Walks the chunk headers from the base, the way the allocation scan
    /// does, yielding each header with its chunk start.
    ///
    /// Chunks covered by a multi-chunk claim hold payload bytes, not a
    /// header, and are stepped over.
    pub(crate) fn heads(
        &self,
        layout: ChunkLayout,
    ) -> impl Iterator<Item = (usize, ChunkHeader)> + '_ {
        let mut cursor = Some(0);

        std::iter::from_fn(move || {
            let start = cursor.filter(|&start| start < self.len())?;
            let header = self.header(start);
            let skip = if header.is_allocated() {
                layout.span(header.bytes_in_use())
            } else {
                layout.stride()
            };
            cursor = start.checked_add(skip);
            Some((start, header))
        })
    }

    /// Resolves a payload handle back to its chunk start.
    ///
    /// Rejects handles from other reservations, handles that do not sit at a
    /// payload position, and handles outside the region as foreign. A handle
    /// into a chunk covered by a live multi-chunk claim names no header: it
    /// can only be stale, and is rejected as not allocated.
    pub(crate) fn chunk_start(&self, layout: ChunkLayout, ptr: ChunkPtr) -> PoolResult<usize> {
        let foreign = PoolError::ForeignPointer { ptr };
        if ptr.pool_id() != self.id {
            return Err(foreign);
        }

        let Some(start) = ptr.offset().checked_sub(layout.payload_offset()) else {
            return Err(foreign);
        };
        if start % layout.stride() != 0 || start >= self.len() {
            return Err(foreign);
        }

        match self.heads(layout).map(|(head, _)| head).find(|&head| head >= start) {
            Some(head) if head == start => Ok(start),
            _ => Err(PoolError::NotAllocated { ptr }),
        }
    }

    /// Payload bytes `[offset, offset + len)`.
    #[inline]
    pub(crate) fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.map[offset..offset + len]
    }

    /// Mutable payload bytes `[offset, offset + len)`.
    #[inline]
    pub(crate) fn bytes_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.map[offset..offset + len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_zeroed() {
        let region = PoolRegion::reserve(24 * 8).unwrap();
        assert_eq!(region.len(), 192);
        assert_ne!(region.base_addr(), 0);
        assert!(region.bytes(0, region.len()).iter().all(|&b| b == 0));
        assert!(!region.header(0).is_allocated());
    }

    #[test]
    fn test_unique_ids() {
        let a = PoolRegion::reserve(64).unwrap();
        let b = PoolRegion::reserve(64).unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.id(), 0);
    }

    #[test]
    fn test_header_roundtrip() {
        let mut region = PoolRegion::reserve(24 * 4).unwrap();
        let mut header = ChunkHeader::default();
        header.claim(8);
        region.write_header(48, header);

        assert_eq!(region.header(48), header);
        assert!(!region.header(24).is_allocated());
    }

    #[test]
    fn test_chunk_start_validation() {
        let layout = ChunkLayout::of::<u64>();
        let region = PoolRegion::reserve(layout.stride() * 4).unwrap();
        let id = region.id();

        assert_eq!(region.chunk_start(layout, ChunkPtr::new(id, 16)).unwrap(), 0);
        assert_eq!(region.chunk_start(layout, ChunkPtr::new(id, 40)).unwrap(), 24);

        // Wrong pool
        assert!(matches!(
            region.chunk_start(layout, ChunkPtr::new(id + 1000, 16)),
            Err(PoolError::ForeignPointer { .. })
        ));
        // Inside a header
        assert!(region.chunk_start(layout, ChunkPtr::new(id, 8)).is_err());
        // Not on a payload boundary
        assert!(region.chunk_start(layout, ChunkPtr::new(id, 20)).is_err());
        // Past the end
        assert!(region.chunk_start(layout, ChunkPtr::new(id, 16 + 24 * 4)).is_err());
        assert!(region.chunk_start(layout, ChunkPtr::DANGLING).is_err());
    }

    #[test]
    fn test_covered_chunks_are_not_heads() {
        let layout = ChunkLayout::of::<u64>();
        let mut region = PoolRegion::reserve(layout.stride() * 4).unwrap();
        let id = region.id();

        // 40 bytes from chunk 0 cover chunks 1 and 2
        let mut header = ChunkHeader::default();
        header.claim(40);
        region.write_header(0, header);

        let heads: Vec<usize> = region.heads(layout).map(|(start, _)| start).collect();
        assert_eq!(heads, vec![0, 72]);

        assert_eq!(region.chunk_start(layout, ChunkPtr::new(id, 16)).unwrap(), 0);
        assert_eq!(region.chunk_start(layout, ChunkPtr::new(id, 88)).unwrap(), 72);
        for covered in [40, 64] {
            assert!(matches!(
                region.chunk_start(layout, ChunkPtr::new(id, covered)),
                Err(PoolError::NotAllocated { .. })
            ));
        }
    }
}
