// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tests for the path-compressed key prefix.

#[cfg(test)]
mod tests {
    use crate::art::prefix::{KeyPrefix, PREFIX_CAPACITY};
    use crate::concurrent::policy::SingleThreaded;

    type Prefix = KeyPrefix<SingleThreaded>;

    #[test]
    fn test_empty_prefix() {
        let p = Prefix::new(&[], 0);
        let snap = p.snapshot();
        assert_eq!(snap.total_len(), 0);
        assert_eq!(snap.stored_len(), 0);
        assert!(snap.is_fully_stored());
    }

    #[test]
    fn test_short_prefix_round_trip() {
        let p = Prefix::new(b"abc", 3);
        let snap = p.snapshot();
        assert_eq!(snap.total_len(), 3);
        assert_eq!(snap.stored_len(), 3);
        assert_eq!(snap.byte(0), b'a');
        assert_eq!(snap.byte(2), b'c');
        let (bytes, len) = snap.stored_bytes();
        assert_eq!(&bytes[..len], b"abc");
    }

    #[test]
    fn test_long_prefix_stores_window() {
        let p = Prefix::new(b"abcdefghij", 10);
        let snap = p.snapshot();
        assert_eq!(snap.total_len(), 10);
        assert_eq!(snap.stored_len(), PREFIX_CAPACITY);
        assert!(!snap.is_fully_stored());
        let (bytes, len) = snap.stored_bytes();
        assert_eq!(&bytes[..len], b"abcdefg");
    }

    #[test]
    fn test_shared_with_stored() {
        let p = Prefix::new(b"abcde", 5);
        let snap = p.snapshot();
        assert_eq!(snap.shared_with_stored(b"abcde-more"), 5);
        assert_eq!(snap.shared_with_stored(b"abcde"), 5);
        assert_eq!(snap.shared_with_stored(b"abcxx"), 3);
        assert_eq!(snap.shared_with_stored(b"xbcde"), 0);
        // Clamped at the key length.
        assert_eq!(snap.shared_with_stored(b"ab"), 2);
        assert_eq!(snap.shared_with_stored(b""), 0);
    }

    #[test]
    fn test_cut() {
        let p = Prefix::new(b"abcde", 5);
        p.cut(2);
        let snap = p.snapshot();
        assert_eq!(snap.total_len(), 3);
        let (bytes, len) = snap.stored_bytes();
        assert_eq!(&bytes[..len], b"cde");
    }

    #[test]
    fn test_cut_whole_prefix() {
        let p = Prefix::new(b"ab", 2);
        p.cut(2);
        assert_eq!(p.snapshot().total_len(), 0);
    }

    #[test]
    fn test_assign_long_then_short() {
        let p = Prefix::new(b"abc", 3);
        p.assign(b"0123456789", 10);
        let snap = p.snapshot();
        assert_eq!(snap.total_len(), 10);
        assert_eq!(snap.stored_len(), PREFIX_CAPACITY);
        p.assign(b"xy", 2);
        let snap = p.snapshot();
        assert_eq!(snap.total_len(), 2);
        assert_eq!(snap.shared_with_stored(b"xyz"), 2);
    }

    #[test]
    fn test_prepend_fits_inline() {
        // parent "ab" ++ [Q] ++ own "cd" => "abQcd"
        let p = Prefix::new(b"cd", 2);
        let parent = Prefix::new(b"ab", 2);
        p.prepend(parent.snapshot(), b'Q');
        let snap = p.snapshot();
        assert_eq!(snap.total_len(), 5);
        let (bytes, len) = snap.stored_bytes();
        assert_eq!(&bytes[..len], b"abQcd");
    }

    #[test]
    fn test_prepend_overflows_window() {
        // parent "abcde" ++ [Q] ++ own "xyz": total 9, window keeps the
        // head of the combined prefix.
        let p = Prefix::new(b"xyz", 3);
        let parent = Prefix::new(b"abcde", 5);
        p.prepend(parent.snapshot(), b'Q');
        let snap = p.snapshot();
        assert_eq!(snap.total_len(), 9);
        assert_eq!(snap.stored_len(), PREFIX_CAPACITY);
        let (bytes, len) = snap.stored_bytes();
        assert_eq!(&bytes[..len], b"abcdeQx");
    }

    #[test]
    fn test_prepend_with_long_parent() {
        // A parent window that is already full wins the whole window.
        let p = Prefix::new(b"tail", 4);
        let parent = Prefix::new(b"0123456789", 10);
        p.prepend(parent.snapshot(), b'Q');
        let snap = p.snapshot();
        assert_eq!(snap.total_len(), 15);
        let (bytes, len) = snap.stored_bytes();
        assert_eq!(&bytes[..len], b"0123456");
    }

    #[test]
    fn test_prepend_empty_parent() {
        let p = Prefix::new(b"cd", 2);
        let parent = Prefix::new(&[], 0);
        p.prepend(parent.snapshot(), b'Q');
        let snap = p.snapshot();
        assert_eq!(snap.total_len(), 3);
        let (bytes, len) = snap.stored_bytes();
        assert_eq!(&bytes[..len], b"Qcd");
    }
}
