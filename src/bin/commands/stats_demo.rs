// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Growth-chain demonstration.
//!
//! Inserts single-byte keys so one node walks N4 -> N16 -> N48 -> N256,
//! printing the structure counters at each threshold, then deletes back
//! down the chain.

use anyhow::Result;
use reedart::{ArtIndex, TreeStats};

fn print_stats(label: &str, stats: &TreeStats, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(stats)?);
    } else {
        println!(
            "{:<24} leaves={:<4} N4={} N16={} N48={} N256={} grows={} shrinks={}",
            label,
            stats.leaf_count,
            stats.node4_count,
            stats.node16_count,
            stats.node48_count,
            stats.node256_count,
            stats.grow_count,
            stats.shrink_count
        );
    }
    Ok(())
}

pub fn run(json: bool) -> Result<()> {
    let mut index = ArtIndex::new();

    let thresholds = [4usize, 5, 16, 17, 48, 49, 256];
    let mut next = 0;
    for b in 0..=255u8 {
        index
            .insert(&[b], &[b])
            .expect("single-byte keys are unique");
        let count = b as usize + 1;
        if next < thresholds.len() && count == thresholds[next] {
            print_stats(&format!("after {} inserts:", count), &index.stats(), json)?;
            next += 1;
        }
    }

    println!();
    for b in (1..=255u8).rev() {
        index.remove(&[b]);
        let count = b as usize;
        if count == 48 || count == 16 || count == 4 || count == 1 {
            print_stats(&format!("after delete to {}:", count), &index.stats(), json)?;
        }
    }

    Ok(())
}
