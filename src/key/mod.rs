// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Binary-comparable key encoding and decoding.
//!
//! The tree orders entries by byte-wise comparison of their keys. This
//! module turns typed values into byte sequences whose lexicographic order
//! equals the semantic order of the original values, and back again.
//!
//! ## Encoding rules
//!
//! - Unsigned integers: big-endian.
//! - Signed integers: big-endian with the sign bit flipped.
//! - IEEE 754 floats: bit-cast to the same-width unsigned, then the sign
//!   bit is set for non-negative values and all bits are complemented for
//!   negative ones. NaN encodes as the maximum word, +inf as maximum minus
//!   one, -inf as zero.
//! - Raw byte spans: copied verbatim.
//! - Text: trailing pad bytes stripped, truncated to the field width, one
//!   pad terminator appended, then the big-endian `u16` residual pad count.
//!   The trailer makes a proper prefix sort strictly before any longer
//!   string sharing it, which a `0x00` pad alone cannot guarantee.
//!
//! ## Example Usage
//!
//! ```rust
//! use reedart::key::{KeyEncoder, KeyDecoder};
//!
//! let mut enc = KeyEncoder::new();
//! enc.encode_u32(7).encode_i64(-42);
//! let key = enc.view().to_vec();
//!
//! let mut dec = KeyDecoder::new(&key);
//! assert_eq!(dec.decode_u32()?, 7);
//! assert_eq!(dec.decode_i64()?, -42);
//! # Ok::<(), reedart::ReedError>(())
//! ```

pub mod decoder;
pub mod encoder;

pub use decoder::KeyDecoder;
pub use encoder::KeyEncoder;

#[cfg(test)]
mod decoder_test;
