//! This module contains the null-bitmap kernel for fixed-width columns.
//!
//! A fixed-width column region starts with one bit per row, packed MSB-first
//! within each byte in row order. A set bit marks the row as null. Bits are
//! addressed through `bitvec`'s `Msb0` ordering, so bit `7 - (row & 7)` of byte
//! `row >> 3` is exactly index `row` of the bit slice.

use bitvec::prelude::*;

use crate::error::{RawBlockError, Result};

/// Number of bytes needed for a bitmap covering `row_count` rows.
pub fn bitmap_len(row_count: usize) -> usize {
    row_count.div_ceil(8)
}

/// Returns `true` if `row` is marked null in `bitmap`.
///
/// # Errors
/// `TruncatedBuffer` if the bitmap is too short to contain `row`.
pub fn is_null(bitmap: &[u8], row: usize) -> Result<bool> {
    let bits = bitmap.view_bits::<Msb0>();
    bits.get(row)
        .map(|bit| *bit)
        .ok_or(RawBlockError::TruncatedBuffer {
            offset: row >> 3,
            needed: 1,
            available: bitmap.len().saturating_sub(row >> 3),
        })
}

/// Sets or clears the null bit for `row`. Used when building blocks.
pub fn set_null(bitmap: &mut [u8], row: usize, null: bool) {
    if let Some(mut bit) = bitmap.view_bits_mut::<Msb0>().get_mut(row) {
        *bit = null;
    }
}

/// Counts the null rows among the first `row_count` bits.
pub fn null_count(bitmap: &[u8], row_count: usize) -> usize {
    let bits = bitmap.view_bits::<Msb0>();
    bits[..row_count.min(bits.len())].count_ones()
}
