// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Path-compressed key prefix.
//!
//! Every internal node stores the bytes shared by all keys below it. The
//! first seven bytes live packed in one 64-bit word together with the
//! stored-length byte; the true prefix length is kept alongside and may
//! exceed the window. A traversal that matches the whole stored window of
//! a longer prefix skips ahead by the true length and verifies against
//! the full key at the leaf; structural operations that need the hidden
//! bytes recover them from any leaf below the node.
//!
//! ## Word layout
//!
//! ```text
//! 63     56 55                                           0
//! ┌────────┬───────────────────────────────────────────────┐
//! │ stored │ prefix bytes, byte i at bits [8i, 8i+8)       │
//! │ length │ (unused high bytes are zero)                  │
//! └────────┴───────────────────────────────────────────────┘
//! ```

use crate::concurrent::cell::SharedCell;
use crate::concurrent::policy::TreePolicy;

/// Bytes held inline; prefixes up to this length are fully stored.
pub(crate) const PREFIX_CAPACITY: usize = 7;

const KEY_BYTES_MASK: u64 = 0x00FF_FFFF_FFFF_FFFF;

/// Packs up to seven prefix bytes and the stored length into one word.
fn make_word(bytes: &[u8]) -> u64 {
    let stored = bytes.len().min(PREFIX_CAPACITY);
    let mut word = 0u64;
    for (i, &b) in bytes[..stored].iter().enumerate() {
        word |= (b as u64) << (8 * i);
    }
    word | ((stored as u64) << 56)
}

/// A consistent value-pair read of a node's prefix.
///
/// Under the optimistic protocol the two loads may be mutually torn; any
/// decision taken from a torn snapshot is discarded by the version check.
/// The accessors themselves never index out of bounds.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PrefixSnapshot {
    word: u64,
    total: u32,
}

impl PrefixSnapshot {
    /// Number of prefix bytes held in the word.
    #[inline]
    pub(crate) fn stored_len(&self) -> usize {
        ((self.word >> 56) as usize).min(PREFIX_CAPACITY)
    }

    /// True prefix length; exceeds `stored_len` for long prefixes.
    #[inline]
    pub(crate) fn total_len(&self) -> usize {
        self.total as usize
    }

    /// Whether the word holds the entire prefix.
    #[inline]
    pub(crate) fn is_fully_stored(&self) -> bool {
        self.total_len() <= PREFIX_CAPACITY
    }

    /// Stored prefix byte `i`.
    #[inline]
    pub(crate) fn byte(&self, i: usize) -> u8 {
        debug_assert!(i < self.stored_len());
        (self.word >> (8 * i)) as u8
    }

    /// The stored window as a slice-backed array.
    pub(crate) fn stored_bytes(&self) -> ([u8; PREFIX_CAPACITY], usize) {
        let mut out = [0u8; PREFIX_CAPACITY];
        let len = self.stored_len();
        for (i, slot) in out.iter_mut().enumerate().take(len) {
            *slot = (self.word >> (8 * i)) as u8;
        }
        (out, len)
    }

    /// Leading bytes of `key` matching the stored window, computed with
    /// one XOR and a trailing-zero count, clamped to the window and key
    /// lengths.
    pub(crate) fn shared_with_stored(&self, key: &[u8]) -> usize {
        let limit = self.stored_len().min(key.len());
        let mut key_word = 0u64;
        for (i, &b) in key.iter().take(PREFIX_CAPACITY).enumerate() {
            key_word |= (b as u64) << (8 * i);
        }
        let diff = (self.word & KEY_BYTES_MASK) ^ key_word;
        ((diff.trailing_zeros() as usize) / 8).min(limit)
    }
}

/// The shared prefix field of an internal node.
pub(crate) struct KeyPrefix<P: TreePolicy> {
    word: P::Cell<u64>,
    total: P::Cell<u32>,
}

impl<P: TreePolicy> KeyPrefix<P> {
    /// Builds a prefix whose true length is `total`; `bytes` must cover
    /// at least the stored window of it.
    pub(crate) fn new(bytes: &[u8], total: usize) -> Self {
        debug_assert!(bytes.len() >= total.min(PREFIX_CAPACITY));
        debug_assert!(total <= u32::MAX as usize);
        Self {
            word: P::Cell::new(make_word(&bytes[..total.min(PREFIX_CAPACITY)])),
            total: P::Cell::new(total as u32),
        }
    }

    /// Copies a prefix observed on another node; used by the grow and
    /// shrink transitions, which run under that node's write lock.
    pub(crate) fn from_snapshot(snap: PrefixSnapshot) -> Self {
        Self {
            word: P::Cell::new(snap.word),
            total: P::Cell::new(snap.total),
        }
    }

    pub(crate) fn snapshot(&self) -> PrefixSnapshot {
        PrefixSnapshot {
            word: self.word.load(),
            total: self.total.load(),
        }
    }

    /// Replaces the prefix. `bytes` must cover the stored window of the
    /// new value. Writers only; callers hold the node's write lock.
    pub(crate) fn assign(&self, bytes: &[u8], total: usize) {
        debug_assert!(bytes.len() >= total.min(PREFIX_CAPACITY));
        self.word.store(make_word(&bytes[..total.min(PREFIX_CAPACITY)]));
        self.total.store(total as u32);
    }

    /// Drops the first `n` bytes of a fully stored prefix, shifting the
    /// remainder left. Long prefixes are re-assigned from recovered
    /// bytes instead (see `assign`).
    pub(crate) fn cut(&self, n: usize) {
        let snap = self.snapshot();
        debug_assert!(snap.is_fully_stored());
        debug_assert!(n <= snap.total_len());
        let (bytes, len) = snap.stored_bytes();
        let remaining = &bytes[n..len];
        self.word.store(make_word(remaining));
        self.total.store((len - n) as u32);
    }

    /// Concatenates `parent ++ [key_byte] ++ self` when a one-child node
    /// collapses into its parent slot. The stored window is refilled
    /// from the parent's window first, so it always holds the first
    /// bytes of the combined prefix.
    pub(crate) fn prepend(&self, parent: PrefixSnapshot, key_byte: u8) {
        let own = self.snapshot();
        let new_total = parent.total_len() + 1 + own.total_len();

        let mut window = [0u8; PREFIX_CAPACITY];
        let mut filled = 0usize;
        let (parent_bytes, parent_stored) = parent.stored_bytes();
        for &b in &parent_bytes[..parent_stored] {
            if filled == PREFIX_CAPACITY {
                break;
            }
            window[filled] = b;
            filled += 1;
        }
        // The parent window is the true head of the combined prefix; the
        // bridging byte and own bytes only enter while room remains.
        if filled < PREFIX_CAPACITY && parent.is_fully_stored() {
            window[filled] = key_byte;
            filled += 1;
            let (own_bytes, own_stored) = own.stored_bytes();
            for &b in &own_bytes[..own_stored] {
                if filled == PREFIX_CAPACITY {
                    break;
                }
                window[filled] = b;
                filled += 1;
            }
        }
        debug_assert!(filled >= new_total.min(PREFIX_CAPACITY));

        self.word.store(make_word(&window[..filled]));
        self.total.store(new_total as u32);
    }
}
