//! # Allocator Capability
//!
//! The minimal contract a container needs to source storage: claim bytes,
//! return bytes, reach the claimed bytes, and build a sibling allocator for
//! its internal node types.

use crate::error::{PoolError, PoolResult};
use crate::memory::ChunkPtr;
use bytemuck::Pod;

/// Storage source for capability-generic containers.
///
/// # Example
///
/// ```rust
/// use poolalloc_core::{ChunkAllocator, PoolAllocator, PoolResult};
///
/// fn store<A: ChunkAllocator>(alloc: &mut A, value: u32) -> PoolResult<u32> {
///     let ptr = alloc.allocate(4)?;
///     alloc.write_pod(ptr, &value)?;
///     let read = alloc.read_pod::<u32>(ptr)?;
///     alloc.deallocate(ptr, 4)?;
///     Ok(read)
/// }
///
/// let mut pool: PoolAllocator<u32> = PoolAllocator::new();
/// assert_eq!(store(&mut pool, 7)?, 7);
/// # Ok::<(), poolalloc_core::PoolError>(())
/// ```
pub trait ChunkAllocator {
    /// The same allocator family parameterized for element type `U`.
    type Rebind<U>: ChunkAllocator;

    /// Claims `bytes` bytes and returns a handle to them.
    ///
    /// # Errors
    ///
    /// Implementation-defined; see [`PoolError`].
    fn allocate(&mut self, bytes: usize) -> PoolResult<ChunkPtr>;

    /// Returns `bytes` bytes of a claim previously made with `allocate`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; see [`PoolError`].
    fn deallocate(&mut self, ptr: ChunkPtr, bytes: usize) -> PoolResult<()>;

    /// Builds an allocator for element type `U` that shares no storage with
    /// `self`.
    fn rebind<U>(&self) -> Self::Rebind<U>;

    /// The claimed bytes behind a live handle.
    ///
    /// # Errors
    ///
    /// Fails if `ptr` is not a live claim of this allocator.
    fn payload(&self, ptr: ChunkPtr) -> PoolResult<&[u8]>;

    /// The claimed bytes behind a live handle, mutably.
    ///
    /// # Errors
    ///
    /// Fails if `ptr` is not a live claim of this allocator.
    fn payload_mut(&mut self, ptr: ChunkPtr) -> PoolResult<&mut [u8]>;

    /// Copies `value` into the front of the claim at `ptr`.
    ///
    /// # Errors
    ///
    /// [`PoolError::PayloadTooSmall`] if the claim is shorter than `V`, or
    /// any error from [`ChunkAllocator::payload_mut`].
    fn write_pod<V: Pod>(&mut self, ptr: ChunkPtr, value: &V) -> PoolResult<()> {
        let src = bytemuck::bytes_of(value);
        let payload = self.payload_mut(ptr)?;
        let available = payload.len();
        let Some(dst) = payload.get_mut(..src.len()) else {
            return Err(PoolError::PayloadTooSmall {
                ptr,
                requested: src.len(),
                available,
            });
        };
        dst.copy_from_slice(src);
        Ok(())
    }

    /// Reads a `V` from the front of the claim at `ptr`.
    ///
    /// # Errors
    ///
    /// [`PoolError::PayloadTooSmall`] if the claim is shorter than `V`, or
    /// any error from [`ChunkAllocator::payload`].
    fn read_pod<V: Pod>(&self, ptr: ChunkPtr) -> PoolResult<V> {
        let size = std::mem::size_of::<V>();
        let payload = self.payload(ptr)?;
        payload
            .get(..size)
            .map(bytemuck::pod_read_unaligned)
            .ok_or(PoolError::PayloadTooSmall {
                ptr,
                requested: size,
                available: payload.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PoolAllocator, PoolConfig};
    use bytemuck::Zeroable;

    #[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
    #[repr(C)]
    struct Particle {
        x: f32,
        y: f32,
        life: f32,
    }

    fn pool<T>() -> PoolAllocator<T> {
        PoolAllocator::with_config(PoolConfig::with_chunk_count(16)).unwrap()
    }

    #[test]
    fn test_pod_roundtrip() {
        let mut alloc: PoolAllocator<Particle> = pool();
        let particle = Particle {
            x: 1.0,
            y: 2.0,
            life: 0.5,
        };

        let ptr = alloc.allocate(std::mem::size_of::<Particle>()).unwrap();
        alloc.write_pod(ptr, &particle).unwrap();
        assert_eq!(alloc.read_pod::<Particle>(ptr).unwrap(), particle);
    }

    #[test]
    fn test_payload_too_small() {
        let mut alloc: PoolAllocator<u64> = pool();
        let ptr = alloc.allocate(4).unwrap();

        assert!(matches!(
            alloc.write_pod(ptr, &7u64),
            Err(PoolError::PayloadTooSmall { requested: 8, available: 4, .. })
        ));
        assert!(matches!(
            alloc.read_pod::<u64>(ptr),
            Err(PoolError::PayloadTooSmall { requested: 8, available: 4, .. })
        ));

        alloc.write_pod(ptr, &9u32).unwrap();
        assert_eq!(alloc.read_pod::<u32>(ptr).unwrap(), 9);
    }

    #[test]
    fn test_generic_rebind() {
        fn sibling<A: ChunkAllocator>(alloc: &A) -> A::Rebind<[u8; 64]> {
            alloc.rebind::<[u8; 64]>()
        }

        let mut alloc: PoolAllocator<u8> = pool();
        alloc.allocate(1).unwrap();

        let mut nodes = sibling(&alloc);
        assert!(!nodes.is_reserved());
        let ptr = nodes.allocate(64).unwrap();
        assert_ne!(ptr.pool_id(), alloc.pool_id().unwrap());
    }
}
