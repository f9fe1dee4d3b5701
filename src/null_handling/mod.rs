//! This module serves as the public API for all null-handling logic.
//!
//! Fixed-width columns mark nulls in a leading bitmap; variable-width columns
//! mark them with a `-1` entry in their offset table (see `raw_block::var`).

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// The kernel for sizing and testing MSB-first null bitmaps.
pub mod bitmap;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================

pub use bitmap::{bitmap_len, is_null};

//==================================================================================
// 3. Unit Tests (Module-level integration tests)
//==================================================================================
