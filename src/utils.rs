//! This module provides the shared, low-level byte access helpers used
//! throughout the decoder.
//!
//! Every primitive read over a borrowed buffer goes through here. There is no
//! raw pointer arithmetic anywhere in the crate: a read either lies entirely
//! inside the slice or fails with `TruncatedBuffer`.

use bytemuck::Pod;
use num_traits::PrimInt;

use crate::error::{RawBlockError, Result};

//==================================================================================
// 1. Random-Access Reads
//==================================================================================

/// Returns `buf[offset..offset + len]`, or `TruncatedBuffer` if any byte lies past the end.
pub fn slice_at(buf: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(RawBlockError::TruncatedBuffer {
            offset,
            needed: len,
            available: buf.len().saturating_sub(offset),
        })
}

/// Reads a little-endian primitive integer at `offset`. No alignment is required.
pub fn read_int_at<T>(buf: &[u8], offset: usize) -> Result<T>
where
    T: PrimInt + Pod,
{
    let bytes = slice_at(buf, offset, std::mem::size_of::<T>())?;
    Ok(T::from_le(bytemuck::pod_read_unaligned(bytes)))
}

//==================================================================================
// 2. Sequential Cursor
//==================================================================================

/// A bounds-checked forward cursor: an offset plus the buffer's known length.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn get_ref(&self) -> &'a [u8] {
        self.buf
    }

    /// Takes the next `len` bytes as a sub-slice of the original buffer.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = slice_at(self.buf, self.pos, len)?;
        self.pos += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_int<T>(&mut self) -> Result<T>
    where
        T: PrimInt + Pod,
    {
        let v = read_int_at::<T>(self.buf, self.pos)?;
        self.pos += std::mem::size_of::<T>();
        Ok(v)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_int::<u8>()
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_int::<i8>()
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }
}
