//! # Pool-Backed Forward List
//!
//! A singly linked list that never touches the global heap for its nodes.
//! The list is handed an allocator for its element type and rebinds it to
//! its node type, so nodes live in a pool sized for link + value:
//!
//! ```text
//! PoolAllocator<V> --rebind--> PoolAllocator<Node<V>>
//!
//! head -> [next | value] -> [next | value] -> [DANGLING | value]
//! ```

use bytemuck::Pod;
use poolalloc_core::{ChunkAllocator, ChunkPtr, PoolResult};
use std::mem::{align_of, size_of};

/// One list node: the link to the next node, then the value.
///
/// Only its layout matters to the allocator; nodes are stored as bytes.
#[repr(C)]
pub struct Node<V> {
    next: ChunkPtr,
    value: V,
}

impl<V: Pod> Node<V> {
    /// Bytes claimed per node.
    const SIZE: usize = size_of::<Self>();
    /// Offset of `value` under `repr(C)`.
    const VALUE_OFFSET: usize = size_of::<ChunkPtr>().next_multiple_of(align_of::<V>());

    fn link(&self) -> Option<ChunkPtr> {
        (!self.next.is_dangling()).then_some(self.next)
    }

    // `buf` is a full node claim: at least SIZE bytes.
    fn encode(&self, buf: &mut [u8]) {
        let value_end = Self::VALUE_OFFSET + size_of::<V>();
        buf[..size_of::<ChunkPtr>()].copy_from_slice(bytemuck::bytes_of(&self.next));
        buf[Self::VALUE_OFFSET..value_end].copy_from_slice(bytemuck::bytes_of(&self.value));
    }

    fn decode(buf: &[u8]) -> Self {
        let value_end = Self::VALUE_OFFSET + size_of::<V>();
        Self {
            next: bytemuck::pod_read_unaligned(&buf[..size_of::<ChunkPtr>()]),
            value: bytemuck::pod_read_unaligned(&buf[Self::VALUE_OFFSET..value_end]),
        }
    }
}

/// A forward list whose nodes are claimed from a rebound pool allocator.
///
/// # Example
///
/// ```rust
/// use poolalloc_core::PoolAllocator;
/// use poolalloc_demo::PoolList;
///
/// let alloc: PoolAllocator<u32> = PoolAllocator::new();
/// let mut list: PoolList<u32, _> = PoolList::new_in(&alloc);
/// list.push_front(2)?;
/// list.push_front(1)?;
/// assert_eq!(list.to_vec()?, vec![1, 2]);
/// # Ok::<(), poolalloc_core::PoolError>(())
/// ```
pub struct PoolList<V, A: ChunkAllocator> {
    /// Node storage, rebound from the element allocator.
    nodes: A::Rebind<Node<V>>,
    /// First node, if any.
    head: Option<ChunkPtr>,
    /// Number of nodes.
    len: usize,
}

impl<V: Pod, A: ChunkAllocator> PoolList<V, A> {
    /// Creates an empty list using a sibling of `alloc` for its nodes.
    ///
    /// `alloc` itself is only used as a recipe; its pool is never touched.
    #[must_use]
    pub fn new_in(alloc: &A) -> Self {
        Self {
            nodes: alloc.rebind::<Node<V>>(),
            head: None,
            len: 0,
        }
    }

    /// Creates a list of `len` zeroed elements.
    ///
    /// # Errors
    ///
    /// Any allocation error from the node pool.
    pub fn with_len_in(len: usize, alloc: &A) -> PoolResult<Self> {
        let mut list = Self::new_in(alloc);
        for _ in 0..len {
            list.push_front(bytemuck::Zeroable::zeroed())?;
        }
        Ok(list)
    }

    /// Number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the list is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The node allocator.
    #[inline]
    #[must_use]
    pub const fn allocator(&self) -> &A::Rebind<Node<V>> {
        &self.nodes
    }

    /// Inserts `value` at the front.
    ///
    /// # Errors
    ///
    /// Any allocation error from the node pool; the list is unchanged.
    pub fn push_front(&mut self, value: V) -> PoolResult<()> {
        let ptr = self.nodes.allocate(Node::<V>::SIZE)?;
        let node = Node {
            next: self.head.unwrap_or(ChunkPtr::DANGLING),
            value,
        };

        match self.nodes.payload_mut(ptr) {
            Ok(buf) => node.encode(buf),
            Err(err) => {
                self.nodes.deallocate(ptr, Node::<V>::SIZE)?;
                return Err(err);
            }
        }

        self.head = Some(ptr);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the front element.
    ///
    /// # Errors
    ///
    /// Fails if the head node cannot be read or released.
    pub fn pop_front(&mut self) -> PoolResult<Option<V>> {
        let Some(ptr) = self.head else {
            return Ok(None);
        };

        let node = Node::<V>::decode(self.nodes.payload(ptr)?);
        self.nodes.deallocate(ptr, Node::<V>::SIZE)?;

        self.head = node.link();
        self.len -= 1;
        Ok(Some(node.value))
    }

    /// Returns a copy of the front element.
    ///
    /// # Errors
    ///
    /// Fails if the head node cannot be read.
    pub fn front(&self) -> PoolResult<Option<V>> {
        self.head
            .map(|ptr| self.nodes.payload(ptr).map(|buf| Node::<V>::decode(buf).value))
            .transpose()
    }

    /// Removes every element, returning each node to the pool.
    ///
    /// # Errors
    ///
    /// Fails if a node cannot be read or released.
    pub fn clear(&mut self) -> PoolResult<()> {
        while self.pop_front()?.is_some() {}
        Ok(())
    }

    /// Replaces the contents with `values`, in order.
    ///
    /// # Errors
    ///
    /// Fails if the old nodes cannot be released or new ones claimed.
    pub fn assign<I: IntoIterator<Item = V>>(&mut self, values: I) -> PoolResult<()> {
        self.clear()?;
        let values: Vec<V> = values.into_iter().collect();
        for value in values.into_iter().rev() {
            self.push_front(value)?;
        }
        Ok(())
    }

    /// Iterates front to back. Each item is a copy of the stored value.
    pub fn iter(&self) -> Iter<'_, V, A> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
        }
    }

    /// Copies the elements into a vector, front to back.
    ///
    /// # Errors
    ///
    /// Fails if a node cannot be read.
    pub fn to_vec(&self) -> PoolResult<Vec<V>> {
        self.iter().collect()
    }
}

/// Front-to-back iterator over a [`PoolList`].
///
/// Stops after the first node that cannot be read.
pub struct Iter<'a, V, A: ChunkAllocator> {
    nodes: &'a A::Rebind<Node<V>>,
    cursor: Option<ChunkPtr>,
}

impl<V: Pod, A: ChunkAllocator> Iterator for Iter<'_, V, A> {
    type Item = PoolResult<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let ptr = self.cursor.take()?;
        match self.nodes.payload(ptr) {
            Ok(buf) => {
                let node = Node::<V>::decode(buf);
                self.cursor = node.link();
                Some(Ok(node.value))
            }
            Err(err) => Some(Err(err)),
        }
    }
}
