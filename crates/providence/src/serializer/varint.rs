// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Variable-length integers and zigzag mapping for the binary format.
//!
//! # Encoding Rules
//!
//! - Each byte carries 7 value bits, bit 7 set means more bytes follow
//! - Groups are emitted least significant first
//! - 32-bit values need at most 5 bytes, 64-bit values at most 10
//! - Signed values are zigzag-mapped first so small magnitudes stay short
//!
//! ```
//! use providence::serializer::varint::{decode_varint, encode_varint, zigzag32};
//!
//! let mut buf = [0u8; 10];
//! let len = encode_varint(300, &mut buf);
//! assert_eq!(&buf[..len], &[0xAC, 0x02]);
//! assert_eq!(decode_varint(&buf[..len]).unwrap(), (300, 2));
//! assert_eq!(zigzag32(-1), 1);
//! ```

use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::error::{CodecError, Result};

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Maximum encoded length of a 32-bit varint.
pub const MAX_VARINT32_LEN: usize = 5;

const CONTINUATION_BIT: u8 = 0x80;
const DATA_MASK: u8 = 0x7F;

/// Zigzag-map a signed 32-bit value: `0, -1, 1, -2` become `0, 1, 2, 3`.
///
/// The arithmetic shift smears the sign bit over the whole word, so the xor
/// flips every bit of negative values after the shift left. Small
/// magnitudes of either sign end up with few significant bits.
#[inline]
#[must_use]
pub const fn zigzag32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

/// Inverse of [`zigzag32`].
#[inline]
#[must_use]
pub const fn unzigzag32(z: u32) -> i32 {
    ((z >> 1) as i32) ^ -((z & 1) as i32)
}

/// Zigzag-map a signed 64-bit value.
#[inline]
#[must_use]
pub const fn zigzag64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Inverse of [`zigzag64`].
#[inline]
#[must_use]
pub const fn unzigzag64(z: u64) -> i64 {
    ((z >> 1) as i64) ^ -((z & 1) as i64)
}

/// Encode `value` into `buf`, returning the number of bytes written.
///
/// # Algorithm
///
/// The value is cut into 7-bit groups starting from the low end. Every group
/// except the last is written with the continuation bit set:
///
/// ```text
/// 0xCAFE = 0b11_0010101_1111110
///   byte 0: 1_1111110 = 0xFE  (bits 0-6, more follow)
///   byte 1: 1_0010101 = 0x95  (bits 7-13, more follow)
///   byte 2: 0_0000011 = 0x03  (bits 14-15, last)
/// ```
///
/// # Panics
///
/// Panics if `buf` is shorter than [`varint_len`] of the value.
#[inline]
pub fn encode_varint(mut value: u64, buf: &mut [u8]) -> usize {
    let mut i = 0;
    loop {
        let byte = (value & u64::from(DATA_MASK)) as u8;
        value >>= 7;
        if value == 0 {
            // last group
            buf[i] = byte;
            return i + 1;
        }
        buf[i] = byte | CONTINUATION_BIT;
        i += 1;
    }
}

/// Number of bytes needed to encode `value`.
///
/// One byte per started group of 7 significant bits; zero still takes one
/// byte. A negative number stored as its two's-complement bit pattern has
/// bit 63 set and always takes the full 10 bytes, which is why signed
/// fields go through [`zigzag64`] first.
#[inline]
#[must_use]
pub const fn varint_len(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Decode a varint from the front of `buf`.
///
/// Returns `(value, bytes_consumed)`.
///
/// # Errors
///
/// - `TruncatedInput` if `buf` ends before a terminating byte
/// - `VarintTooLong` past 10 bytes or when the value overflows 64 bits
#[inline]
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if i >= MAX_VARINT_LEN {
            return Err(CodecError::VarintTooLong {
                max: MAX_VARINT_LEN,
            });
        }
        let data = u64::from(byte & DATA_MASK);
        // Only bit 0 of the 10th group fits into 64 bits.
        if shift == 63 && data > 1 {
            return Err(CodecError::VarintTooLong {
                max: MAX_VARINT_LEN,
            });
        }
        result |= data << shift;
        if byte & CONTINUATION_BIT == 0 {
            return Ok((result, i + 1));
        }
        shift += 7;
    }

    Err(CodecError::TruncatedInput)
}

/// Write `value` as a varint to a stream, returning the bytes written.
pub fn write_varint(out: &mut dyn Write, value: u64) -> Result<usize> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let len = encode_varint(value, &mut buf);
    out.write_all(&buf[..len])?;
    Ok(len)
}

/// Read a 64-bit varint from a stream.
pub fn read_varint64(input: &mut dyn Read) -> Result<u64> {
    read_bounded(input, MAX_VARINT_LEN).map(|(v, _)| v)
}

/// Read a 32-bit varint from a stream.
///
/// Fails with `VarintTooLong` after 5 bytes without termination, or when the
/// 5th group carries bits beyond 32.
pub fn read_varint32(input: &mut dyn Read) -> Result<u32> {
    let (value, _) = read_bounded(input, MAX_VARINT32_LEN)?;
    u32::try_from(value).map_err(|_| CodecError::VarintTooLong {
        max: MAX_VARINT32_LEN,
    })
}

fn read_bounded(input: &mut dyn Read, max: usize) -> Result<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    for i in 0..max {
        let byte = input.read_u8()?;
        let data = u64::from(byte & DATA_MASK);
        if shift == 63 && data > 1 {
            return Err(CodecError::VarintTooLong { max });
        }
        result |= data << shift;
        if byte & CONTINUATION_BIT == 0 {
            return Ok((result, i + 1));
        }
        shift += 7;
    }
    Err(CodecError::VarintTooLong { max })
}

/// Write a zigzag-mapped 32-bit value.
pub fn write_zigzag32(out: &mut dyn Write, value: i32) -> Result<usize> {
    write_varint(out, u64::from(zigzag32(value)))
}

/// Write a zigzag-mapped 64-bit value.
pub fn write_zigzag64(out: &mut dyn Write, value: i64) -> Result<usize> {
    write_varint(out, zigzag64(value))
}

pub fn read_zigzag32(input: &mut dyn Read) -> Result<i32> {
    read_varint32(input).map(unzigzag32)
}

pub fn read_zigzag64(input: &mut dyn Read) -> Result<i64> {
    read_varint64(input).map(unzigzag64)
}

/// Write a single raw byte (wire tags, bools).
#[inline]
pub(crate) fn write_byte(out: &mut dyn Write, byte: u8) -> Result<usize> {
    out.write_u8(byte)?;
    Ok(1)
}
