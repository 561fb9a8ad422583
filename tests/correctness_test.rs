// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end correctness scenarios over the public API.

use rand::{Rng, SeedableRng};
use reedart::{ArtIndex, KeyDecoder, KeyEncoder};
use std::collections::BTreeMap;

fn key(v: u64) -> [u8; 8] {
    v.to_be_bytes()
}

#[test]
fn test_scenario_point_and_range() {
    // (1,V1), (10,V2), (50,V3): scans in both directions and ranges
    // with an exclusive `to` bound.
    let mut index = ArtIndex::new();
    index.insert(&key(1), b"V1").unwrap();
    index.insert(&key(10), b"V2").unwrap();
    index.insert(&key(50), b"V3").unwrap();

    let mut forward = Vec::new();
    index.scan(true, |k, v| {
        forward.push((k.to_vec(), v.to_vec()));
        false
    });
    assert_eq!(
        forward,
        vec![
            (key(1).to_vec(), b"V1".to_vec()),
            (key(10).to_vec(), b"V2".to_vec()),
            (key(50).to_vec(), b"V3".to_vec())
        ]
    );

    let mut reverse = Vec::new();
    index.scan(false, |k, v| {
        reverse.push((k.to_vec(), v.to_vec()));
        false
    });
    let mut expected = forward.clone();
    expected.reverse();
    assert_eq!(reverse, expected);

    let mut range = Vec::new();
    index.scan_range(&key(10), &key(50), |k, _| {
        range.push(k.to_vec());
        false
    });
    assert_eq!(range, vec![key(10).to_vec()]);

    let mut rev_range = Vec::new();
    index.scan_range(&key(50), &key(10), |k, _| {
        rev_range.push(k.to_vec());
        false
    });
    assert_eq!(rev_range, vec![key(50).to_vec()]);

    let mut everything_rev = Vec::new();
    index.scan_range(&key(50), &key(0), |k, _| {
        everything_rev.push(k.to_vec());
        false
    });
    assert_eq!(
        everything_rev,
        vec![key(50).to_vec(), key(10).to_vec(), key(1).to_vec()]
    );
}

#[test]
fn test_scenario_thousand_sequential() {
    let mut index = ArtIndex::new();
    for i in 0..1000u64 {
        assert!(index.insert(&key(i), format!("V{}", i).as_bytes()).unwrap());
    }

    let mut expected = 0u64;
    index.scan(true, |k, _| {
        assert_eq!(k, key(expected));
        expected += 1;
        false
    });
    assert_eq!(expected, 1000);

    assert_eq!(index.get(&key(523)), Some(&b"V523"[..]));
    assert!(index.remove(&key(523)));
    assert_eq!(index.get(&key(523)), None);
    assert_eq!(index.len(), 999);
    for i in 0..1000u64 {
        assert_eq!(index.contains(&key(i)), i != 523);
    }
}

#[test]
fn test_scenario_growth_chain_stats() {
    let mut index = ArtIndex::new();
    for b in 0..=255u8 {
        index.insert(&[b], &[b]).unwrap();
    }
    let stats = index.stats();
    assert_eq!(stats.leaf_count, 256);
    assert_eq!(stats.node256_count, 1);
    assert_eq!(stats.node4_count + stats.node16_count + stats.node48_count, 0);
    assert_eq!(stats.grow_count, 3);

    // Deleting enough keys reverses the chain.
    for b in 4..=255u8 {
        assert!(index.remove(&[b]));
    }
    let stats = index.stats();
    assert_eq!(stats.leaf_count, 4);
    assert_eq!(stats.node4_count, 1);
    assert_eq!(stats.node256_count, 0);
    assert!(stats.shrink_count >= 3);
}

#[test]
fn test_scenario_signed_encoding_order() {
    // i32 -1 and 0: the sign-bit flip yields 0x7FFFFFFF and 0x80000000.
    let mut enc = KeyEncoder::new();
    enc.encode_i32(-1);
    let minus_one = enc.view().to_vec();
    enc.reset().encode_i32(0);
    let zero = enc.view().to_vec();
    assert_eq!(minus_one, vec![0x7F, 0xFF, 0xFF, 0xFF]);
    assert_eq!(zero, vec![0x80, 0x00, 0x00, 0x00]);
    assert!(minus_one < zero);

    // And the index agrees with that order.
    let mut index = ArtIndex::new();
    index.insert(&zero, b"zero").unwrap();
    index.insert(&minus_one, b"minus-one").unwrap();
    let mut values = Vec::new();
    index.scan(true, |_, v| {
        values.push(v.to_vec());
        false
    });
    assert_eq!(values, vec![b"minus-one".to_vec(), b"zero".to_vec()]);
}

#[test]
fn test_scenario_text_prefix_order() {
    // "bro" sorts strictly before "brown" with pad 0x00, width 128.
    let mut enc = KeyEncoder::new();
    enc.encode_text(b"bro", 128).unwrap();
    let bro = enc.view().to_vec();
    enc.reset();
    enc.encode_text(b"brown", 128).unwrap();
    let brown = enc.view().to_vec();
    assert!(bro < brown);

    let mut index = ArtIndex::new();
    index.insert(&brown, b"brown").unwrap();
    index.insert(&bro, b"bro").unwrap();
    let mut first = None;
    index.scan(true, |_, v| {
        first = Some(v.to_vec());
        true
    });
    assert_eq!(first, Some(b"bro".to_vec()));
}

#[test]
fn test_typed_key_round_trip_through_index() {
    let mut index = ArtIndex::new();
    let mut enc = KeyEncoder::new();
    for user in 0..50u32 {
        for score in [-2i64, 0, 7] {
            enc.reset();
            enc.encode_u32(user).encode_i64(score);
            index
                .insert(enc.view(), format!("{}:{}", user, score).as_bytes())
                .unwrap();
        }
    }
    assert_eq!(index.len(), 150);

    let mut seen = Vec::new();
    index.scan(true, |k, _| {
        let mut dec = KeyDecoder::new(k);
        let user = dec.decode_u32().unwrap();
        let score = dec.decode_i64().unwrap();
        seen.push((user, score));
        false
    });
    let mut expected = seen.clone();
    expected.sort();
    assert_eq!(seen, expected, "typed keys iterate in semantic order");
    assert_eq!(seen.len(), 150);
}

#[test]
fn test_reference_equivalence_mixed_workload() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0xC0FFEE);
    let mut index = ArtIndex::new();
    let mut reference: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();

    for step in 0..30_000u32 {
        // Mixed fixed-width and variable-length keys.
        let k: Vec<u8> = if rng.gen_bool(0.5) {
            key(rng.gen_range(0..800)).to_vec()
        } else {
            let len = rng.gen_range(9..20);
            let mut v = vec![b'k'; len];
            let tail = rng.gen_range(0..100u8);
            v.push(tail);
            v
        };
        match rng.gen_range(0..4) {
            0 | 1 => {
                let value = step.to_le_bytes().to_vec();
                let inserted = index.insert(&k, &value).unwrap();
                assert_eq!(inserted, !reference.contains_key(&k));
                reference.entry(k).or_insert(value);
            }
            2 => {
                assert_eq!(index.remove(&k), reference.remove(&k).is_some());
            }
            _ => {
                assert_eq!(index.get(&k), reference.get(&k).map(|v| &v[..]));
            }
        }
    }

    // Final full-order comparison.
    let mut scanned = Vec::new();
    index.scan(true, |k, v| {
        scanned.push((k.to_vec(), v.to_vec()));
        false
    });
    let expected: Vec<_> = reference.into_iter().collect();
    assert_eq!(scanned, expected);
}

#[test]
fn test_scan_from_matches_reference() {
    let mut index = ArtIndex::new();
    let keys: Vec<u64> = (0..200).map(|i| i * 3 + 1).collect();
    for &k in &keys {
        index.insert(&key(k), b"v").unwrap();
    }
    for probe in [0u64, 1, 2, 100, 300, 598, 599, 1000] {
        let mut got = Vec::new();
        index.scan_from(&key(probe), true, |k, _| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(k);
            got.push(u64::from_be_bytes(bytes));
            got.len() >= 3
        });
        let expected: Vec<u64> = keys.iter().copied().filter(|&k| k >= probe).take(3).collect();
        assert_eq!(got, expected, "scan_from {} forward", probe);

        let mut got_rev = Vec::new();
        index.scan_from(&key(probe), false, |k, _| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(k);
            got_rev.push(u64::from_be_bytes(bytes));
            got_rev.len() >= 3
        });
        let expected_rev: Vec<u64> = keys
            .iter()
            .rev()
            .copied()
            .filter(|&k| k <= probe)
            .take(3)
            .collect();
        assert_eq!(got_rev, expected_rev, "scan_from {} reverse", probe);
    }
}

#[test]
fn test_clear_then_reuse() {
    let mut index = ArtIndex::new();
    for i in 0..500u64 {
        index.insert(&key(i), b"v").unwrap();
    }
    index.clear();
    assert!(index.is_empty());
    for i in 0..500u64 {
        assert_eq!(index.get(&key(i)), None);
    }
    for i in 0..500u64 {
        assert!(index.insert(&key(i), b"w").unwrap());
    }
    assert_eq!(index.len(), 500);
}
