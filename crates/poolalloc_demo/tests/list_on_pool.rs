//! # Pool-Backed List Tests
//!
//! Drives `PoolList` only through the public allocator contract, the way an
//! external container would.
//!
//! Run with: cargo test --package poolalloc_demo --test list_on_pool

use poolalloc_core::{ChunkAllocator, PoolAllocator, PoolConfig, PoolError};
use poolalloc_demo::{InlineStr, PoolList};

fn text(s: &str) -> InlineStr {
    InlineStr::new(s).unwrap()
}

#[test]
fn two_bursts_match_expected_contents() {
    let alloc: PoolAllocator<InlineStr> = PoolAllocator::new();
    let mut list = PoolList::with_len_in(5, &alloc).unwrap();
    for _ in 0..20 {
        list.push_front(text("29")).unwrap();
    }
    list.push_front(text("a")).unwrap();

    let rendered: Vec<String> = list
        .iter()
        .map(|item| item.unwrap().to_string())
        .collect();
    let expected: Vec<String> = std::iter::once("a")
        .chain(std::iter::repeat("29").take(20))
        .chain(std::iter::repeat("").take(5))
        .map(str::to_string)
        .collect();
    assert_eq!(rendered, expected);

    list.assign(["a", "b", "c"].map(text)).unwrap();
    assert_eq!(list.to_vec().unwrap(), ["a", "b", "c"].map(text).to_vec());

    // Freed nodes are reused from the pool base
    let nodes = list.allocator();
    assert_eq!(nodes.live_chunks(), 3);
    assert!((0..3).all(|i| nodes.chunk(i).unwrap().allocated));
    assert!(!nodes.chunk(3).unwrap().allocated);
}

#[test]
fn recipe_allocator_is_never_reserved() {
    let alloc: PoolAllocator<InlineStr> =
        PoolAllocator::with_config(PoolConfig::with_chunk_count(16)).unwrap();
    let mut list = PoolList::new_in(&alloc);
    list.push_front(text("x")).unwrap();

    assert!(!alloc.is_reserved());
    assert_eq!(alloc.stats().allocations, 0);
    assert_eq!(list.allocator().chunk_count(), 16);
    assert_eq!(list.allocator().stats().reservations, 1);
}

#[test]
fn lists_from_one_recipe_do_not_share_nodes() {
    let alloc: PoolAllocator<u32> = PoolAllocator::new();
    let mut left: PoolList<u32, _> = PoolList::new_in(&alloc);
    let mut right: PoolList<u32, _> = PoolList::new_in(&alloc);

    left.push_front(1).unwrap();
    right.push_front(2).unwrap();

    assert_ne!(left.allocator().pool_id(), right.allocator().pool_id());
    assert_eq!(left.to_vec().unwrap(), vec![1]);
    assert_eq!(right.to_vec().unwrap(), vec![2]);
}

#[test]
fn exhausted_node_pool_surfaces_as_error() {
    fn fill<A: ChunkAllocator>(alloc: &A, n: usize) -> Result<PoolList<u16, A>, PoolError> {
        let mut list = PoolList::new_in(alloc);
        for i in 0..n {
            list.push_front(u16::try_from(i).unwrap())?;
        }
        Ok(list)
    }

    let alloc: PoolAllocator<u16> =
        PoolAllocator::with_config(PoolConfig::with_chunk_count(8)).unwrap();
    assert_eq!(fill(&alloc, 8).unwrap().len(), 8);
    assert!(matches!(
        fill(&alloc, 9),
        Err(PoolError::PoolExhausted { chunk_count: 8, .. })
    ));
}
