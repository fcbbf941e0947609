//! # POOLALLOC Demo Driver
//!
//! Builds a forward list of short strings on pool allocators and times two
//! insertion bursts.
//!
//! ```bash
//! # Default 4096-chunk pools
//! pool_demo
//!
//! # Chunk count from a config file
//! pool_demo pool.toml
//!
//! # Trace every claim and release
//! RUST_LOG=debug pool_demo
//! ```

use poolalloc_core::{ChunkAllocator, PoolAllocator, PoolConfig, PoolResult};
use poolalloc_demo::{InlineStr, PoolList};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Elements in the list before the first burst.
const INITIAL_LEN: usize = 5;

/// Repetitions of the repeated element in the first burst.
const BURST_LEN: usize = 20;

fn print_list<A: ChunkAllocator>(list: &PoolList<InlineStr, A>) -> PoolResult<()> {
    let items: Vec<String> = list
        .iter()
        .map(|item| item.map(|s| s.to_string()))
        .collect::<PoolResult<_>>()?;
    println!("{}", items.join(" "));
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PoolConfig::from_file(path)?,
        None => PoolConfig::default(),
    };
    let alloc: PoolAllocator<InlineStr> = PoolAllocator::with_config(config)?;

    let repeated = InlineStr::new("29")?;
    let last = InlineStr::new("a")?;

    // Burst 1: construct with defaults, then push to the front
    let start = Instant::now();
    let mut list = PoolList::with_len_in(INITIAL_LEN, &alloc)?;
    for _ in 0..BURST_LEN {
        list.push_front(repeated)?;
    }
    list.push_front(last)?;
    let first_burst = start.elapsed();

    print_list(&list)?;

    // Burst 2: replace the whole contents
    let replacement = [
        InlineStr::new("a")?,
        InlineStr::new("b")?,
        InlineStr::new("c")?,
    ];
    let start = Instant::now();
    list.assign(replacement)?;
    let second_burst = start.elapsed();

    print_list(&list)?;

    let stats = list.allocator().stats();
    println!("burst 1: {}us", first_burst.as_micros());
    println!("burst 2: {}us", second_burst.as_micros());
    println!(
        "nodes: {} live, {} claimed, {} freed, {:.1} headers scanned per claim",
        list.allocator().live_chunks(),
        stats.allocations,
        stats.chunks_freed,
        stats.average_scan_length()
    );

    Ok(())
}
