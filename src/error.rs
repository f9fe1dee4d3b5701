// In: src/error.rs

//! This module defines the single, unified error type for the entire rawblock library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every variant is a local decode failure. Nothing is retried inside the decoder;
//! the caller logs the error and abandons that one decode.

use thiserror::Error;

use crate::types::Precision;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RawBlockError>;

#[derive(Error, Debug)]
pub enum RawBlockError {
    // =========================================================================
    // === Buffer-Level Errors
    // =========================================================================
    /// A read would run past the end of the borrowed buffer.
    #[error("Truncated buffer: need {needed} bytes at offset {offset}, only {available} available")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// An offset or length inside a block disagrees with the block's own bookkeeping.
    #[error("Corrupt block: {0}")]
    CorruptBlock(String),

    #[error("VarInt at offset {offset} does not fit in 64 bits")]
    VarIntOverflow { offset: usize },

    // =========================================================================
    // === Semantic Errors
    // =========================================================================
    #[error("Unknown column type tag: {0}")]
    UnknownType(u8),

    #[error("Unknown envelope head tag: {0}")]
    UnknownEnvelopeTag(u8),

    #[error("Unknown timestamp precision code: {0}")]
    UnknownPrecision(u8),

    #[error("Timestamp {ticks} is not representable at {precision} precision")]
    TimestampOutOfRange { ticks: i64, precision: Precision },

    // =========================================================================
    // === Envelope Metadata Errors
    // =========================================================================
    #[error("Incomplete schema at offset {offset}: claims {needed} bytes, {available} remain")]
    IncompleteSchema {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Incomplete name at offset {offset}: claims {needed} bytes, {available} remain")]
    IncompleteName {
        offset: usize,
        needed: usize,
        available: usize,
    },

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error from the Serde JSON library, raised when parsing JSON cells or config.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Row matrix reshaping failed; indicates a bookkeeping bug in the block decoder.
    #[error("Row matrix shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl RawBlockError {
    /// Shorthand for building a `CorruptBlock` from any displayable message.
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        RawBlockError::CorruptBlock(msg.into())
    }

    /// Returns `true` for the two variants that signal a damaged or short buffer.
    pub fn is_malformed_buffer(&self) -> bool {
        matches!(
            self,
            RawBlockError::TruncatedBuffer { .. } | RawBlockError::CorruptBlock(_)
        )
    }
}
