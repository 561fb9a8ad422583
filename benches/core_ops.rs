// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Core index operation benchmarks (single-threaded variant).
//!
//! Measures performance of:
//! - insert() - sequential and shuffled key orders
//! - get() - point lookups over a populated index
//! - remove() - full teardown
//! - scan() - ordered full traversal
//!
//! ## Performance Targets
//! - insert: > 1M ops/s sequential
//! - get: > 2M ops/s
//! - scan: > 10M entries/s

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reedart::ArtIndex;

/// Generate dense big-endian keys.
fn sequential_keys(n: u64) -> Vec<[u8; 8]> {
    (0..n).map(|i| i.to_be_bytes()).collect()
}

/// Generate scattered unique keys; the odd multiplier is a bijection
/// over u64.
fn shuffled_keys(n: u64) -> Vec<[u8; 8]> {
    (0..n)
        .map(|i| i.wrapping_mul(0x9E3779B97F4A7C15).to_be_bytes())
        .collect()
}

fn populated(keys: &[[u8; 8]]) -> ArtIndex {
    let mut index = ArtIndex::new();
    for key in keys {
        index.insert(key, b"benchmark-value").unwrap();
    }
    index
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for size in [1_000u64, 100_000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("sequential", size), &size, |b, &n| {
            let keys = sequential_keys(n);
            b.iter(|| {
                let mut index = ArtIndex::new();
                for key in &keys {
                    index.insert(black_box(key), b"benchmark-value").unwrap();
                }
                black_box(index.len())
            });
        });
        group.bench_with_input(BenchmarkId::new("shuffled", size), &size, |b, &n| {
            let keys = shuffled_keys(n);
            b.iter(|| {
                let mut index = ArtIndex::new();
                for key in &keys {
                    index.insert(black_box(key), b"benchmark-value").unwrap();
                }
                black_box(index.len())
            });
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    for size in [1_000u64, 100_000] {
        let keys = sequential_keys(size);
        let index = populated(&keys);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                for key in &keys {
                    black_box(index.get(black_box(key)));
                }
            });
        });
    }
    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");
    group.sample_size(20);
    for size in [1_000u64, 100_000] {
        let keys = sequential_keys(size);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter_batched(
                || populated(&keys),
                |mut index| {
                    for key in &keys {
                        index.remove(black_box(key));
                    }
                    black_box(index.is_empty())
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    for size in [1_000u64, 100_000] {
        let keys = sequential_keys(size);
        let index = populated(&keys);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("forward", size), &size, |b, _| {
            b.iter(|| {
                let mut visited = 0u64;
                index.scan(true, |_, _| {
                    visited += 1;
                    false
                });
                black_box(visited)
            });
        });
        group.bench_with_input(BenchmarkId::new("reverse", size), &size, |b, _| {
            b.iter(|| {
                let mut visited = 0u64;
                index.scan(false, |_, _| {
                    visited += 1;
                    false
                });
                black_box(visited)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_get, bench_remove, bench_scan);
criterion_main!(benches);
