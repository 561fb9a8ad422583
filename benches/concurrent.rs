// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Concurrent index benchmarks: OLC variant against the mutex baseline.
//!
//! Measures disjoint-range parallel inserts and read-heavy mixed
//! workloads at several thread counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reedart::{qsbr, MutexIndex, OlcIndex};
use std::sync::Arc;

const KEYS_PER_THREAD: u64 = 10_000;

fn bench_parallel_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_insert");
    group.sample_size(10);
    for threads in [1u64, 2, 4] {
        group.throughput(Throughput::Elements(threads * KEYS_PER_THREAD));
        group.bench_with_input(BenchmarkId::new("olc", threads), &threads, |b, &t| {
            b.iter(|| {
                let index = Arc::new(OlcIndex::new());
                let workers: Vec<_> = (0..t)
                    .map(|w| {
                        let index = Arc::clone(&index);
                        std::thread::spawn(move || {
                            qsbr::register_current_thread();
                            let base = w * KEYS_PER_THREAD;
                            for i in 0..KEYS_PER_THREAD {
                                let key = (base + i).to_be_bytes();
                                index.insert(&key, b"v").unwrap();
                                if i % 1024 == 0 {
                                    qsbr::quiescent();
                                }
                            }
                            qsbr::quiescent();
                            qsbr::unregister_current_thread();
                        })
                    })
                    .collect();
                for worker in workers {
                    worker.join().unwrap();
                }
                black_box(index.len())
            });
        });
        group.bench_with_input(BenchmarkId::new("mutex", threads), &threads, |b, &t| {
            b.iter(|| {
                let index = Arc::new(MutexIndex::new());
                let workers: Vec<_> = (0..t)
                    .map(|w| {
                        let index = Arc::clone(&index);
                        std::thread::spawn(move || {
                            let base = w * KEYS_PER_THREAD;
                            for i in 0..KEYS_PER_THREAD {
                                let key = (base + i).to_be_bytes();
                                index.insert(&key, b"v").unwrap();
                            }
                        })
                    })
                    .collect();
                for worker in workers {
                    worker.join().unwrap();
                }
                black_box(index.len())
            });
        });
    }
    group.finish();
}

fn bench_read_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_heavy");
    group.sample_size(10);

    let olc = Arc::new(OlcIndex::new());
    qsbr::register_current_thread();
    for i in 0..100_000u64 {
        olc.insert(&i.to_be_bytes(), b"v").unwrap();
    }
    qsbr::quiescent();
    qsbr::unregister_current_thread();

    let mutex = Arc::new(MutexIndex::new());
    for i in 0..100_000u64 {
        mutex.insert(&i.to_be_bytes(), b"v").unwrap();
    }

    for threads in [1u64, 2, 4] {
        group.throughput(Throughput::Elements(threads * KEYS_PER_THREAD));
        group.bench_with_input(BenchmarkId::new("olc", threads), &threads, |b, &t| {
            b.iter(|| {
                let workers: Vec<_> = (0..t)
                    .map(|w| {
                        let index = Arc::clone(&olc);
                        std::thread::spawn(move || {
                            qsbr::register_current_thread();
                            for i in 0..KEYS_PER_THREAD {
                                let key = ((w * 7919 + i * 13) % 100_000).to_be_bytes();
                                black_box(index.contains(&key));
                            }
                            qsbr::quiescent();
                            qsbr::unregister_current_thread();
                        })
                    })
                    .collect();
                for worker in workers {
                    worker.join().unwrap();
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("mutex", threads), &threads, |b, &t| {
            b.iter(|| {
                let workers: Vec<_> = (0..t)
                    .map(|w| {
                        let index = Arc::clone(&mutex);
                        std::thread::spawn(move || {
                            for i in 0..KEYS_PER_THREAD {
                                let key = ((w * 7919 + i * 13) % 100_000).to_be_bytes();
                                black_box(index.contains(&key));
                            }
                        })
                    })
                    .collect();
                for worker in workers {
                    worker.join().unwrap();
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parallel_insert, bench_read_heavy);
criterion_main!(benches);
