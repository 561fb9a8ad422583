// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tests for the mutex-serialised index.

#[cfg(test)]
mod tests {
    use crate::index::mutex::MutexIndex;
    use std::sync::Arc;

    fn key(v: u64) -> [u8; 8] {
        v.to_be_bytes()
    }

    #[test]
    fn test_basic_ops_through_shared_ref() {
        let index = MutexIndex::new();
        assert!(index.insert(&key(1), b"one").unwrap());
        assert!(!index.insert(&key(1), b"dup").unwrap());
        assert_eq!(index.get(&key(1)), Some(b"one".to_vec()));
        assert!(index.contains(&key(1)));
        assert!(index.remove(&key(1)));
        assert!(index.is_empty());
    }

    #[test]
    fn test_scan_under_lock() {
        let index = MutexIndex::new();
        for i in [5u64, 1, 3] {
            index.insert(&key(i), b"v").unwrap();
        }
        let mut seen = Vec::new();
        index.scan(true, |k, _| {
            seen.push(k.to_vec());
            false
        });
        assert_eq!(seen, vec![key(1).to_vec(), key(3).to_vec(), key(5).to_vec()]);
    }

    #[test]
    fn test_concurrent_disjoint_inserts() {
        let index = Arc::new(MutexIndex::new());
        let threads: Vec<_> = (0..4u64)
            .map(|t| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for i in 0..1000u64 {
                        let k = key(t * 1000 + i);
                        assert!(index.insert(&k, &k).unwrap());
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(index.len(), 4000);
        let mut count = 0u64;
        let mut prev: Option<Vec<u8>> = None;
        index.scan(true, |k, _| {
            if let Some(p) = &prev {
                assert!(p[..] < *k);
            }
            prev = Some(k.to_vec());
            count += 1;
            false
        });
        assert_eq!(count, 4000);
    }

    #[test]
    fn test_concurrent_mixed_ops() {
        let index = Arc::new(MutexIndex::new());
        for i in 0..100u64 {
            index.insert(&key(i), b"seed").unwrap();
        }
        let threads: Vec<_> = (0..4u64)
            .map(|t| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for i in 0..100u64 {
                        match t % 2 {
                            0 => {
                                index.get(&key(i));
                            }
                            _ => {
                                index.insert(&key(100 + t * 100 + i), b"new").unwrap();
                            }
                        }
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(index.len(), 100 + 200);
    }
}
