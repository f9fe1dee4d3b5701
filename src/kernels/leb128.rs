//! This module contains the pure, stateless kernels for LEB128 (Little-Endian
//! Base 128) variable-length integer encoding and decoding.
//!
//! Envelopes use this encoding for block lengths, name lengths and, combined with
//! zig-zag, for the signed schema fields. Each byte's low 7 bits are a digit, the
//! high bit means "more bytes follow", and digits arrive least-significant first.
//! It is fully panic-free.

use num_traits::{PrimInt, Unsigned};

use crate::error::{RawBlockError, Result};
use crate::utils::ByteCursor;

/// The most bytes a `u64` can occupy.
const MAX_U64_LEN: usize = 10;

//==================================================================================
// 1. Public API for Single-Value Operations
//==================================================================================

/// Encodes a single unsigned integer into a LEB128 byte sequence, writing to a buffer.
pub fn encode_one<T>(value: T, buffer: &mut Vec<u8>)
where
    T: PrimInt + Unsigned,
{
    let zero = T::zero();
    let seven_bit_mask = T::from(0x7F).unwrap_or(zero);

    let mut current_value = value;
    loop {
        let digit = (current_value & seven_bit_mask).to_u8().unwrap_or(0);
        current_value = current_value >> 7;
        if current_value == zero {
            buffer.push(digit);
            break;
        }
        buffer.push(digit | 0x80);
    }
}

/// Decodes the varint starting at `offset`, returning the value and the number
/// of bytes it occupied.
///
/// # Errors
/// `TruncatedBuffer` if the buffer ends before a byte with the high bit clear,
/// `VarIntOverflow` if the encoding is longer than any `u64` needs.
pub fn read_varint(buf: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    let mut consumed = 0usize;

    loop {
        let byte = *buf
            .get(offset + consumed)
            .ok_or(RawBlockError::TruncatedBuffer {
                offset: offset + consumed,
                needed: 1,
                available: 0,
            })?;
        consumed += 1;

        let digit = u64::from(byte & 0x7F);
        // The tenth byte may only contribute the single remaining bit.
        if consumed == MAX_U64_LEN && (digit > 1 || byte & 0x80 != 0) {
            return Err(RawBlockError::VarIntOverflow { offset });
        }
        result |= digit << shift;

        if byte & 0x80 == 0 {
            return Ok((result, consumed));
        }
        shift += 7;
    }
}

/// Decodes a single varint from a cursor, advancing it past the encoding.
pub fn decode_one(cursor: &mut ByteCursor<'_>) -> Result<u64> {
    let (value, consumed) = read_varint(cursor.get_ref(), cursor.position())?;
    cursor.skip(consumed)?;
    Ok(value)
}
