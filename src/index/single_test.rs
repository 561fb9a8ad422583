// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tests for the single-threaded public index.

#[cfg(test)]
mod tests {
    use crate::index::single::ArtIndex;
    use crate::key::KeyEncoder;

    fn key(v: u64) -> [u8; 8] {
        v.to_be_bytes()
    }

    #[test]
    fn test_insert_get_symmetry() {
        let mut index = ArtIndex::new();
        assert!(index.insert(&key(1), b"one").unwrap());
        assert_eq!(index.get(&key(1)), Some(&b"one"[..]));
        assert!(index.remove(&key(1)));
        assert_eq!(index.get(&key(1)), None);
    }

    #[test]
    fn test_borrowed_value_survives_reads() {
        let mut index = ArtIndex::new();
        index.insert(&key(1), b"stable").unwrap();
        let value = index.get(&key(1)).unwrap();
        // Further reads do not invalidate the borrow.
        assert!(index.contains(&key(1)));
        assert_eq!(value, b"stable");
    }

    #[test]
    fn test_encoder_integration() {
        let mut index = ArtIndex::new();
        let mut enc = KeyEncoder::new();
        for word in ["pear", "apple", "orange"] {
            enc.reset();
            enc.encode_text(word.as_bytes(), 32).unwrap();
            index.insert(enc.view(), word.as_bytes()).unwrap();
        }
        let mut seen = Vec::new();
        index.scan(true, |_, v| {
            seen.push(String::from_utf8(v.to_vec()).unwrap());
            false
        });
        assert_eq!(seen, vec!["apple", "orange", "pear"]);
    }

    #[test]
    fn test_scenario_basic_range() {
        // Insert (1,V1) (10,V2) (50,V3); scans and ranges in both
        // directions.
        let mut index = ArtIndex::new();
        index.insert(&key(1), b"V1").unwrap();
        index.insert(&key(10), b"V2").unwrap();
        index.insert(&key(50), b"V3").unwrap();

        let mut fwd = Vec::new();
        index.scan(true, |k, v| {
            fwd.push((k.to_vec(), v.to_vec()));
            false
        });
        assert_eq!(
            fwd,
            vec![
                (key(1).to_vec(), b"V1".to_vec()),
                (key(10).to_vec(), b"V2".to_vec()),
                (key(50).to_vec(), b"V3".to_vec())
            ]
        );

        let mut rev = Vec::new();
        index.scan(false, |k, _| {
            rev.push(k.to_vec());
            false
        });
        assert_eq!(
            rev,
            vec![key(50).to_vec(), key(10).to_vec(), key(1).to_vec()]
        );

        let mut range = Vec::new();
        index.scan_range(&key(10), &key(50), |k, _| {
            range.push(k.to_vec());
            false
        });
        assert_eq!(range, vec![key(10).to_vec()]);

        // Reverse range (10, 50] visits 50 only; `to` stays exclusive.
        let mut rev_range = Vec::new();
        index.scan_range(&key(50), &key(10), |k, _| {
            rev_range.push(k.to_vec());
            false
        });
        assert_eq!(rev_range, vec![key(50).to_vec()]);
    }

    #[test]
    fn test_stats_growth_chain() {
        let mut index = ArtIndex::new();
        for b in 0..=255u8 {
            index.insert(&[b], &[b]).unwrap();
        }
        let stats = index.stats();
        assert_eq!(stats.leaf_count, 256);
        assert_eq!(stats.node256_count, 1);
        assert_eq!(stats.grow_count, 3);

        for b in 0..210u8 {
            index.remove(&[b]);
        }
        let stats = index.stats();
        assert_eq!(stats.leaf_count, 46);
        assert_eq!(stats.node256_count, 0);
        assert_eq!(stats.node48_count, 1);
        assert!(stats.shrink_count >= 1);
    }

    #[test]
    fn test_dump_is_stable() {
        let mut index = ArtIndex::new();
        index.insert(&key(1), b"V1").unwrap();
        index.insert(&key(2), b"V2").unwrap();
        let mut first = Vec::new();
        index.dump(&mut first).unwrap();
        let mut second = Vec::new();
        index.dump(&mut second).unwrap();
        assert_eq!(first, second);
        let text = String::from_utf8(first).unwrap();
        assert!(text.contains("2 entries"));
        assert!(text.contains("leaf"));
    }

    #[test]
    fn test_clear() {
        let mut index = ArtIndex::new();
        for i in 0..100u64 {
            index.insert(&key(i), b"v").unwrap();
        }
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.get(&key(42)), None);
        assert!(index.insert(&key(42), b"again").unwrap());
        assert_eq!(index.len(), 1);
    }
}
