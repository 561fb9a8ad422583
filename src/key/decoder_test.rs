// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Tests for the key decoder.

#[cfg(test)]
mod tests {
    use crate::error::ReedError;
    use crate::key::{KeyDecoder, KeyEncoder};

    #[test]
    fn test_decode_all_scalar_types() {
        let mut enc = KeyEncoder::new();
        enc.encode_u8(8)
            .encode_u16(16)
            .encode_u32(32)
            .encode_u64(64)
            .encode_i8(-8)
            .encode_i16(-16)
            .encode_i32(-32)
            .encode_i64(-64);
        let mut dec = KeyDecoder::new(enc.view());
        assert_eq!(dec.decode_u8().unwrap(), 8);
        assert_eq!(dec.decode_u16().unwrap(), 16);
        assert_eq!(dec.decode_u32().unwrap(), 32);
        assert_eq!(dec.decode_u64().unwrap(), 64);
        assert_eq!(dec.decode_i8().unwrap(), -8);
        assert_eq!(dec.decode_i16().unwrap(), -16);
        assert_eq!(dec.decode_i32().unwrap(), -32);
        assert_eq!(dec.decode_i64().unwrap(), -64);
        assert_eq!(dec.remaining(), 0);
    }

    #[test]
    fn test_decode_bytes_span() {
        let mut enc = KeyEncoder::new();
        enc.append_bytes(b"raw-span").unwrap();
        enc.encode_u8(0xFF);
        let mut dec = KeyDecoder::new(enc.view());
        assert_eq!(dec.decode_bytes(8).unwrap(), b"raw-span");
        assert_eq!(dec.decode_u8().unwrap(), 0xFF);
    }

    #[test]
    fn test_decode_past_end_fails() {
        let buf = [1u8, 2, 3];
        let mut dec = KeyDecoder::new(&buf);
        let err = dec.decode_u64().unwrap_err();
        assert_eq!(
            err,
            ReedError::DecodeOutOfBounds {
                wanted: 8,
                remaining: 3
            }
        );
        // A failed read consumes nothing.
        assert_eq!(dec.remaining(), 3);
        assert_eq!(dec.decode_u16().unwrap(), 0x0102);
    }

    #[test]
    fn test_decode_empty_buffer() {
        let mut dec = KeyDecoder::new(&[]);
        assert!(dec.decode_u8().is_err());
        assert_eq!(dec.remaining(), 0);
    }
}
