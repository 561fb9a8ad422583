// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Key encoder producing binary-comparable byte sequences.
//!
//! Accumulates typed fields into an internal buffer. The buffer starts as
//! a 256-byte inline array and spills to the heap with power-of-two
//! doubling when a key outgrows it, so short keys never allocate.
//!
//! ## Example Usage
//!
//! ```rust
//! use reedart::key::KeyEncoder;
//!
//! let mut enc = KeyEncoder::new();
//! enc.encode_u64(42);
//! assert_eq!(enc.view(), &[0, 0, 0, 0, 0, 0, 0, 42]);
//!
//! enc.reset();
//! enc.encode_text(b"bro", 128)?;
//! assert_eq!(enc.view(), &[b'b', b'r', b'o', 0x00, 0x00, 125]);
//! # Ok::<(), reedart::ReedError>(())
//! ```

use crate::error::{ReedError, ReedResult};

/// Inline buffer size; keys at most this long never touch the heap.
pub const INLINE_CAPACITY: usize = 256;

/// Maximum encoded key length (the leaf key-length field is a `u32`).
pub const MAX_KEY_BYTES: usize = u32::MAX as usize;

/// Accumulates typed fields into a binary-comparable key.
///
/// Scalar encoders chain (`enc.encode_u32(a).encode_u32(b)`); the
/// span-sized encoders return `ReedResult` because they can overflow the
/// `u32` key-length field.
pub struct KeyEncoder {
    /// Inline storage, used until a key outgrows it.
    inline: [u8; INLINE_CAPACITY],

    /// Heap storage, empty until the first spill.
    spill: Vec<u8>,

    /// Number of encoded bytes since the last `reset`.
    len: usize,
}

impl KeyEncoder {
    /// Creates an encoder with an empty buffer.
    pub fn new() -> Self {
        Self {
            inline: [0u8; INLINE_CAPACITY],
            spill: Vec::new(),
            len: 0,
        }
    }

    /// Resets the encoder to encode another key.
    ///
    /// Keeps any heap capacity acquired by earlier keys.
    pub fn reset(&mut self) -> &mut Self {
        self.len = 0;
        self
    }

    /// Read-only view of the bytes encoded since the last `reset`.
    pub fn view(&self) -> &[u8] {
        if self.spill.is_empty() {
            &self.inline[..self.len]
        } else {
            &self.spill[..self.len]
        }
    }

    /// Number of bytes encoded since the last `reset`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been encoded since the last `reset`.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // unsigned integers: big-endian

    pub fn encode_u8(&mut self, v: u8) -> &mut Self {
        self.push(&[v]);
        self
    }

    pub fn encode_u16(&mut self, v: u16) -> &mut Self {
        self.push(&v.to_be_bytes());
        self
    }

    pub fn encode_u32(&mut self, v: u32) -> &mut Self {
        self.push(&v.to_be_bytes());
        self
    }

    pub fn encode_u64(&mut self, v: u64) -> &mut Self {
        self.push(&v.to_be_bytes());
        self
    }

    // signed integers: flip the sign bit, then big-endian

    pub fn encode_i8(&mut self, v: i8) -> &mut Self {
        self.encode_u8((v as u8) ^ (1 << 7))
    }

    pub fn encode_i16(&mut self, v: i16) -> &mut Self {
        self.encode_u16((v as u16) ^ (1 << 15))
    }

    pub fn encode_i32(&mut self, v: i32) -> &mut Self {
        self.encode_u32((v as u32) ^ (1 << 31))
    }

    pub fn encode_i64(&mut self, v: i64) -> &mut Self {
        self.encode_u64((v as u64) ^ (1 << 63))
    }

    // IEEE 754 floats: DuckDB-derived total order over the full real line

    pub fn encode_f32(&mut self, v: f32) -> &mut Self {
        self.encode_u32(encode_f32_bits(v))
    }

    pub fn encode_f64(&mut self, v: f64) -> &mut Self {
        self.encode_u64(encode_f64_bits(v))
    }

    /// Appends raw bytes verbatim.
    pub fn append_bytes(&mut self, span: &[u8]) -> ReedResult<&mut Self> {
        if self.len + span.len() > MAX_KEY_BYTES {
            return Err(ReedError::KeyTooLong {
                len: self.len + span.len(),
            });
        }
        self.push(span);
        Ok(self)
    }

    /// Encodes a length-truncated, pad-terminated text field.
    ///
    /// Trailing `pad` bytes are stripped, the remainder is truncated to
    /// `max_len` bytes, one `pad` terminator is appended, then the
    /// big-endian `u16` count of residual pad positions. The trailer makes
    /// `"bro"` sort strictly before `"brown"` even with a `0x00` pad.
    pub fn encode_text(&mut self, text: &[u8], max_len: u16) -> ReedResult<&mut Self> {
        self.encode_text_padded(text, max_len, 0x00)
    }

    /// `encode_text` with an explicit pad byte.
    pub fn encode_text_padded(
        &mut self,
        text: &[u8],
        max_len: u16,
        pad: u8,
    ) -> ReedResult<&mut Self> {
        let stripped = {
            let mut end = text.len();
            while end > 0 && text[end - 1] == pad {
                end -= 1;
            }
            &text[..end]
        };
        let truncated = if stripped.len() > max_len as usize {
            &stripped[..max_len as usize]
        } else {
            stripped
        };
        let residual = max_len - truncated.len() as u16;

        if self.len + truncated.len() + 3 > MAX_KEY_BYTES {
            return Err(ReedError::KeyTooLong {
                len: self.len + truncated.len() + 3,
            });
        }
        self.push(truncated);
        self.push(&[pad]);
        self.push(&residual.to_be_bytes());
        Ok(self)
    }

    /// Appends bytes, spilling from the inline buffer to the heap when the
    /// key outgrows it. Heap growth doubles to the next power of two.
    fn push(&mut self, bytes: &[u8]) {
        let required = self.len + bytes.len();
        if self.spill.is_empty() {
            if required <= INLINE_CAPACITY {
                self.inline[self.len..required].copy_from_slice(bytes);
                self.len = required;
                return;
            }
            self.spill.reserve(required.next_power_of_two());
            self.spill.extend_from_slice(&self.inline[..self.len]);
        } else if required > self.spill.capacity() {
            self.spill
                .reserve(required.next_power_of_two() - self.spill.len());
        }
        self.spill.truncate(self.len);
        self.spill.extend_from_slice(bytes);
        self.len = self.spill.len();
    }
}

impl Default for KeyEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps an `f32` to a `u32` whose unsigned order equals the total order
/// over the real line: -inf < negatives < -0 == +0 < positives < +inf < NaN.
pub(crate) fn encode_f32_bits(v: f32) -> u32 {
    if v.is_nan() {
        return u32::MAX;
    }
    if v.is_infinite() {
        return if v > 0.0 { u32::MAX - 1 } else { 0 };
    }
    let bits = v.to_bits();
    if bits & (1 << 31) == 0 {
        bits | (1 << 31)
    } else {
        !bits
    }
}

/// Inverse of `encode_f32_bits`; NaN decodes to the canonical NaN.
pub(crate) fn decode_f32_bits(u: u32) -> f32 {
    if u == u32::MAX {
        return f32::NAN;
    }
    if u == u32::MAX - 1 {
        return f32::INFINITY;
    }
    if u == 0 {
        return f32::NEG_INFINITY;
    }
    if u & (1 << 31) != 0 {
        f32::from_bits(u ^ (1 << 31))
    } else {
        f32::from_bits(!u)
    }
}

/// `f64` counterpart of `encode_f32_bits`.
pub(crate) fn encode_f64_bits(v: f64) -> u64 {
    if v.is_nan() {
        return u64::MAX;
    }
    if v.is_infinite() {
        return if v > 0.0 { u64::MAX - 1 } else { 0 };
    }
    let bits = v.to_bits();
    if bits & (1 << 63) == 0 {
        bits | (1 << 63)
    } else {
        !bits
    }
}

/// Inverse of `encode_f64_bits`; NaN decodes to the canonical NaN.
pub(crate) fn decode_f64_bits(u: u64) -> f64 {
    if u == u64::MAX {
        return f64::NAN;
    }
    if u == u64::MAX - 1 {
        return f64::INFINITY;
    }
    if u == 0 {
        return f64::NEG_INFINITY;
    }
    if u & (1 << 63) != 0 {
        f64::from_bits(u ^ (1 << 63))
    } else {
        f64::from_bits(!u)
    }
}
