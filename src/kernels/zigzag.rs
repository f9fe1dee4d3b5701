//! This module contains the pure, stateless kernels for Zig-zag encoding and decoding.
//!
//! Zig-zag is a lossless, bitwise mapping of signed integers to unsigned ones
//! (0, -1, 1, -2, ... -> 0, 1, 2, 3, ...). Envelope schemas store signed fields
//! this way before varint-packing them.

use num_traits::{AsPrimitive, PrimInt, Signed, Unsigned, Zero};

use crate::error::Result;
use crate::kernels::leb128;
use crate::traits::{HasSigned, HasUnsigned};
use crate::utils::ByteCursor;

//==================================================================================
// 1. Generic Core Logic
//==================================================================================

/// Encodes a single signed integer using the Zig-zag algorithm.
pub fn encode_val<T>(n: T) -> T::Unsigned
where
    T: PrimInt + Signed + HasUnsigned + AsPrimitive<T::Unsigned>,
    T::Unsigned: PrimInt + 'static,
{
    let bits = std::mem::size_of::<T>() * 8;
    // The right shift on a signed primitive is arithmetic.
    ((n << 1) ^ (n >> (bits - 1))).as_()
}

/// Decodes a single unsigned integer back to its signed representation.
pub fn decode_val<U>(n: U) -> U::Signed
where
    U: PrimInt + Unsigned + HasSigned + AsPrimitive<U::Signed>,
    U::Signed: PrimInt + 'static,
{
    // (n >> 1) ^ -(n & 1)
    let shifted: U::Signed = (n >> 1).as_();
    let lsb: U::Signed = (n & U::one()).as_();
    shifted ^ (U::Signed::zero() - lsb)
}

//==================================================================================
// 2. Public API
//==================================================================================

pub fn zigzag_decode(n: u64) -> i64 {
    decode_val(n)
}

pub fn zigzag_encode(x: i64) -> u64 {
    encode_val(x)
}

/// Reads a zig-zag encoded, varint-packed signed integer from a cursor.
pub fn read_zigzag_varint(cursor: &mut ByteCursor<'_>) -> Result<i64> {
    leb128::decode_one(cursor).map(zigzag_decode)
}

//==================================================================================
// 3. Unit Tests
//==================================================================================
