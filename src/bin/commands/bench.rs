// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Quick smoke benchmark of the concurrent index.
//!
//! Each worker inserts a disjoint key range, reads it back, then one
//! thread scans everything. Rough numbers for a sanity check; the
//! criterion benchmarks in `benches/` are the real measurements.

use anyhow::Result;
use reedart::{qsbr, OlcIndex};
use std::sync::Arc;
use std::time::Instant;

pub fn run(keys_per_thread: u64, threads: u64) -> Result<()> {
    anyhow::ensure!(threads > 0, "need at least one thread");
    anyhow::ensure!(keys_per_thread > 0, "need at least one key");

    let index = Arc::new(OlcIndex::new());
    let total = keys_per_thread * threads;

    println!(
        "reedart bench: {} threads x {} keys = {} entries",
        threads, keys_per_thread, total
    );

    let start = Instant::now();
    let workers: Vec<_> = (0..threads)
        .map(|t| {
            let index = Arc::clone(&index);
            std::thread::spawn(move || {
                qsbr::register_current_thread();
                let base = t * keys_per_thread;
                for i in 0..keys_per_thread {
                    let key = (base + i).to_be_bytes();
                    index
                        .insert(&key, &key)
                        .expect("bench keys are within limits");
                    if i % 4096 == 0 {
                        qsbr::quiescent();
                    }
                }
                qsbr::quiescent();
                qsbr::unregister_current_thread();
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("bench worker panicked");
    }
    let insert_secs = start.elapsed().as_secs_f64();
    println!(
        "insert: {:.3}s ({:.0} ops/s)",
        insert_secs,
        total as f64 / insert_secs
    );

    let start = Instant::now();
    let workers: Vec<_> = (0..threads)
        .map(|t| {
            let index = Arc::clone(&index);
            std::thread::spawn(move || {
                qsbr::register_current_thread();
                let base = t * keys_per_thread;
                for i in 0..keys_per_thread {
                    let key = (base + i).to_be_bytes();
                    assert!(index.contains(&key));
                    if i % 4096 == 0 {
                        qsbr::quiescent();
                    }
                }
                qsbr::quiescent();
                qsbr::unregister_current_thread();
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("bench worker panicked");
    }
    let get_secs = start.elapsed().as_secs_f64();
    println!(
        "get:    {:.3}s ({:.0} ops/s)",
        get_secs,
        total as f64 / get_secs
    );

    qsbr::register_current_thread();
    let start = Instant::now();
    let mut visited = 0u64;
    index.scan(true, |_, _| {
        visited += 1;
        false
    });
    let scan_secs = start.elapsed().as_secs_f64();
    qsbr::quiescent();
    qsbr::unregister_current_thread();
    anyhow::ensure!(visited == total, "scan visited {} of {}", visited, total);
    println!(
        "scan:   {:.3}s ({:.0} entries/s)",
        scan_secs,
        total as f64 / scan_secs
    );

    let stats = index.stats();
    println!(
        "nodes: {} leaves, {} N4, {} N16, {} N48, {} N256, {} resident bytes",
        stats.leaf_count,
        stats.node4_count,
        stats.node16_count,
        stats.node48_count,
        stats.node256_count,
        stats.resident_bytes
    );

    Ok(())
}
