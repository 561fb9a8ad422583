// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Adaptive Radix Tree core.
//!
//! The shared tree behind all three index variants. Keys are
//! binary-comparable byte strings; values are opaque byte sequences
//! copied into leaves on insert.
//!
//! ## Structure
//!
//! ```text
//! tagged pointer (ptr)       one word, low bits = node kind
//!       │
//!       ├── leaf             full key + value, immutable
//!       └── internal node    N4 / N16 / N48 / N256
//!             ├── header     version lock, key prefix, child count
//!             └── children   kind-specific dispatch by key byte
//! ```
//!
//! Nodes grow to the next kind when an insert finds them full and
//! shrink back when a removal takes them below the kind minimum; a
//! four-child node left with one child collapses into its parent slot.
//! Common key bytes are path-compressed into per-node prefixes.

pub(crate) mod dump;
pub(crate) mod inode;
pub(crate) mod iter;
pub(crate) mod leaf;
pub(crate) mod node16;
pub(crate) mod node256;
pub(crate) mod node4;
pub(crate) mod node48;
pub(crate) mod prefix;
pub(crate) mod ptr;
pub mod stats;
pub(crate) mod tree;

pub use stats::TreeStats;

#[cfg(test)]
mod prefix_test;
