// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! ReedART - in-memory ordered key/value index engine.
//!
//! An Adaptive Radix Tree over binary-comparable keys, in three
//! variants sharing one core:
//!
//! - **ArtIndex**: single-threaded, no synchronisation overhead
//! - **MutexIndex**: coarse mutex serialisation
//! - **OlcIndex**: optimistic version locking with QSBR reclamation
//!
//! ## Features
//!
//! - **Adaptive nodes**: four internal layouts (4/16/48/256 children)
//!   that grow and shrink with the data
//! - **Path compression**: shared key bytes stored once per node
//! - **Binary-comparable keys**: typed encoder for integers, floats,
//!   byte spans and padded text, ordered by plain `memcmp`
//! - **Ordered scans**: forward/reverse iteration, seek, half-open
//!   ranges with early-terminating visitors
//! - **Lock-free reads**: readers write no shared state in the OLC
//!   variant
//!
//! ## Quick Start
//!
//! ```rust
//! use reedart::{ArtIndex, KeyEncoder};
//!
//! let mut index = ArtIndex::new();
//! let mut enc = KeyEncoder::new();
//!
//! for id in [1u64, 10, 50] {
//!     enc.reset().encode_u64(id);
//!     index.insert(enc.view(), format!("V{}", id).as_bytes())?;
//! }
//!
//! enc.reset().encode_u64(10);
//! assert_eq!(index.get(enc.view()), Some(&b"V10"[..]));
//!
//! let mut keys = Vec::new();
//! index.scan(true, |key, _value| {
//!     keys.push(key.to_vec());
//!     false
//! });
//! assert_eq!(keys.len(), 3);
//! # Ok::<(), reedart::ReedError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ ArtIndex │ MutexIndex │ OlcIndex              │  index/
//! ├───────────────────────────────────────────────┤
//! │ tree algorithms: insert / remove / find /     │  art/
//! │ seek / scan, over N4 N16 N48 N256 + leaves    │
//! ├──────────────────────┬────────────────────────┤
//! │ optimistic lock,     │ QSBR: epochs,          │  concurrent/,
//! │ fake lock, cells     │ deferred free, orphans │  qsbr/
//! ├──────────────────────┴────────────────────────┤
//! │ binary-comparable key encoder / decoder       │  key/
//! └───────────────────────────────────────────────┘
//! ```

pub mod art;
pub mod concurrent;
pub mod error;
pub mod index;
pub mod key;
pub mod qsbr;

// Re-export commonly used types
pub use art::TreeStats;
pub use error::{ReedError, ReedResult};
pub use index::{ArtIndex, MutexIndex, OlcIndex};
pub use key::{KeyDecoder, KeyEncoder};
pub use qsbr::QsbrStats;
