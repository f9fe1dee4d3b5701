//! This module groups the pure, stateless scalar codecs used by the envelope
//! format: LEB128 varints and zig-zag signed integers.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Base-128, continuation-bit-delimited unsigned integers.
pub mod leb128;

/// Signed-to-unsigned mapping applied before varint packing.
pub mod zigzag;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================

pub use leb128::read_varint;
pub use zigzag::{read_zigzag_varint, zigzag_decode, zigzag_encode};
