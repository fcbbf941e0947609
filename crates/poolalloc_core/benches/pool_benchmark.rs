//! # Pool Allocator Benchmark
//!
//! The allocation scan is linear from the pool base, so allocation cost
//! grows with the number of live chunks in front of the first free one.
//! These benchmarks measure that growth and the in-place free path.
//!
//! Run with: `cargo bench --package poolalloc_core`

// Benchmarks don't need docs
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use poolalloc_core::{PoolAllocator, PoolConfig};

/// Same footprint as a 64-bit `String`.
type Name = [u8; 24];

/// Benchmark: first allocation, which maps the pool.
fn bench_first_allocation(c: &mut Criterion) {
    c.bench_function("first_allocation_4096", |b| {
        b.iter(|| {
            let mut pool: PoolAllocator<Name> = PoolAllocator::new();
            black_box(pool.allocate(24).unwrap())
        });
    });
}

/// Benchmark: allocate + free of one chunk behind `live` claimed chunks.
fn bench_scan_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate_behind_live_chunks");

    for live in [0_usize, 64, 512, 4_000] {
        group.bench_with_input(BenchmarkId::from_parameter(live), &live, |b, &live| {
            let mut pool: PoolAllocator<Name> = PoolAllocator::new();
            for _ in 0..live {
                pool.allocate(24).unwrap();
            }

            b.iter(|| {
                let ptr = pool.allocate(black_box(24)).unwrap();
                pool.deallocate(ptr, 24).unwrap();
            });
        });
    }

    group.finish();
}

/// Benchmark: fill a pool completely, then release everything in reverse.
fn bench_fill_and_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill_and_drain");

    for chunks in [64_usize, 1_024] {
        group.bench_with_input(BenchmarkId::from_parameter(chunks), &chunks, |b, &chunks| {
            let mut pool: PoolAllocator<u64> =
                PoolAllocator::with_config(PoolConfig::with_chunk_count(chunks)).unwrap();
            let mut ptrs = Vec::with_capacity(chunks);

            b.iter(|| {
                for _ in 0..chunks {
                    ptrs.push(pool.allocate(8).unwrap());
                }
                while let Some(ptr) = ptrs.pop() {
                    pool.deallocate(ptr, 8).unwrap();
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_first_allocation,
    bench_scan_depth,
    bench_fill_and_drain
);
criterion_main!(benches);
