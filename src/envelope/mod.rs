//! The change-stream envelope: a container holding one or more raw blocks,
//! each optionally followed by its schema and table name.
//!
//! Parsing only locates blocks; see [`parser::BlockInfo`] for lazy decoding.

pub mod parser;

pub use parser::{parse_envelope, parse_envelope_with, BlockInfo, EnvelopeParser};

#[cfg(test)]
mod tests;
