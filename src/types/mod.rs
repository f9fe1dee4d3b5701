//! This module defines the core, strongly-typed data representations used
//! throughout the decoder.
//!
//! It includes the canonical `TaosDataType` enum which replaces the wire's bare
//! type-tag bytes with an exhaustively matched enum, the timestamp `Precision`,
//! the column descriptors, and the decoded `Value` union.

pub mod column;
pub mod precision;
pub mod taos_data_type;
pub mod value;

// Re-export the main type(s) for easier access.
pub use column::{ColumnDescriptor, SchemaColumn};
pub use precision::{Precision, Timestamp};
pub use taos_data_type::TaosDataType;
pub use value::{Row, Value};
