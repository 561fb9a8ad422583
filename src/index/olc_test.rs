// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tests for the optimistic concurrent index.
//!
//! These register threads with the process-wide QSBR instance and run
//! serially against the other QSBR-touching suites.

#[cfg(test)]
mod tests {
    use crate::index::olc::OlcIndex;
    use crate::qsbr;
    use serial_test::serial;
    use std::sync::Arc;

    fn key(v: u64) -> [u8; 8] {
        v.to_be_bytes()
    }

    #[test]
    #[serial]
    fn test_basic_ops_single_thread() {
        let index = OlcIndex::new();
        qsbr::register_current_thread();

        assert!(index.insert(&key(1), b"one").unwrap());
        assert!(!index.insert(&key(1), b"dup").unwrap());
        assert_eq!(index.get(&key(1)), Some(b"one".to_vec()));
        assert_eq!(index.get_with(&key(1), |v| v.len()), Some(3));
        assert!(index.remove(&key(1)));
        assert_eq!(index.get(&key(1)), None);

        qsbr::quiescent();
        qsbr::unregister_current_thread();
    }

    #[test]
    #[serial]
    fn test_reclamation_after_removals() {
        let index = OlcIndex::new();
        qsbr::register_current_thread();
        for i in 0..1000u64 {
            index.insert(&key(i), b"payload").unwrap();
        }
        for i in 0..1000u64 {
            assert!(index.remove(&key(i)));
        }
        assert!(index.is_empty());
        // Everything retired drains once this thread quiesces.
        qsbr::quiescent();
        qsbr::unregister_current_thread();
        let stats = qsbr::Qsbr::instance().stats();
        assert_eq!(stats.deferred_count, stats.freed_count);
        assert_eq!(stats.deferred_bytes, stats.freed_bytes);
    }

    #[test]
    #[serial]
    fn test_disjoint_parallel_inserts_scan_in_order() {
        // Four threads insert disjoint ranges; a final scan sees all
        // entries in order.
        const PER_THREAD: u64 = 10_000;
        let index = Arc::new(OlcIndex::new());
        let threads: Vec<_> = (0..4u64)
            .map(|t| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    qsbr::register_current_thread();
                    for i in 0..PER_THREAD {
                        let k = key(t * PER_THREAD + i);
                        assert!(index.insert(&k, &k).unwrap());
                        if i % 1000 == 0 {
                            qsbr::quiescent();
                        }
                    }
                    qsbr::quiescent();
                    qsbr::unregister_current_thread();
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        qsbr::register_current_thread();
        assert_eq!(index.len(), 4 * PER_THREAD as usize);
        let mut expected = 0u64;
        index.scan(true, |k, v| {
            assert_eq!(k, key(expected));
            assert_eq!(v, key(expected));
            expected += 1;
            false
        });
        assert_eq!(expected, 4 * PER_THREAD);
        qsbr::quiescent();
        qsbr::unregister_current_thread();
    }

    #[test]
    #[serial]
    fn test_readers_during_writes() {
        let index = Arc::new(OlcIndex::new());
        qsbr::register_current_thread();
        for i in 0..1000u64 {
            index.insert(&key(i), &key(i)).unwrap();
        }

        let writer = {
            let index = Arc::clone(&index);
            std::thread::spawn(move || {
                qsbr::register_current_thread();
                for i in 1000..2000u64 {
                    index.insert(&key(i), &key(i)).unwrap();
                    if i % 100 == 0 {
                        qsbr::quiescent();
                    }
                }
                qsbr::quiescent();
                qsbr::unregister_current_thread();
            })
        };
        let remover = {
            let index = Arc::clone(&index);
            std::thread::spawn(move || {
                qsbr::register_current_thread();
                for i in (0..500u64).rev() {
                    assert!(index.remove(&key(i)));
                    if i % 100 == 0 {
                        qsbr::quiescent();
                    }
                }
                qsbr::quiescent();
                qsbr::unregister_current_thread();
            })
        };

        // Stable residents stay readable through concurrent structural
        // changes around them.
        for round in 0..2000u64 {
            let k = key(500 + (round % 500));
            assert_eq!(index.get(&k), Some(k.to_vec()));
            if round % 250 == 0 {
                qsbr::quiescent();
            }
        }

        writer.join().unwrap();
        remover.join().unwrap();

        assert_eq!(index.len(), 1500);
        for i in 0..500u64 {
            assert_eq!(index.get(&key(i)), None);
        }
        for i in 500..2000u64 {
            assert_eq!(index.get(&key(i)), Some(key(i).to_vec()));
        }
        qsbr::quiescent();
        qsbr::unregister_current_thread();
    }

    #[test]
    #[serial]
    fn test_contended_same_range_inserts() {
        // All threads race on the same keys; exactly one wins each.
        let index = Arc::new(OlcIndex::new());
        let wins = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let index = Arc::clone(&index);
                let wins = Arc::clone(&wins);
                std::thread::spawn(move || {
                    qsbr::register_current_thread();
                    for i in 0..2000u64 {
                        if index.insert(&key(i), b"winner").unwrap() {
                            wins.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                        }
                        if i % 500 == 0 {
                            qsbr::quiescent();
                        }
                    }
                    qsbr::quiescent();
                    qsbr::unregister_current_thread();
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(wins.load(std::sync::atomic::Ordering::Relaxed), 2000);
        assert_eq!(index.len(), 2000);
    }

    #[test]
    #[serial]
    fn test_clear_with_exclusive_access() {
        let mut index = OlcIndex::new();
        qsbr::register_current_thread();
        for i in 0..100u64 {
            index.insert(&key(i), b"v").unwrap();
        }
        index.clear();
        assert!(index.is_empty());
        assert!(index.insert(&key(1), b"fresh").unwrap());
        qsbr::quiescent();
        qsbr::unregister_current_thread();
    }

    #[test]
    #[serial]
    fn test_dump_exclusive() {
        let mut index = OlcIndex::new();
        qsbr::register_current_thread();
        index.insert(&key(3), b"x").unwrap();
        index.insert(&key(4), b"y").unwrap();
        let mut out = Vec::new();
        index.dump(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("2 entries"));
        qsbr::quiescent();
        qsbr::unregister_current_thread();
    }
}
