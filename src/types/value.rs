//! # Decoded Cell Values
//!
//! `Value<T>` is the owned, per-cell result of decoding a raw block. It never
//! borrows from the source buffer: the buffer belongs to the foreign client and
//! is only valid for the duration of one decode call.
//!
//! The timestamp payload type `T` is chosen by the caller through a
//! [`TimestampConverter`](crate::traits::TimestampConverter); it defaults to
//! `chrono::DateTime<Utc>`.
//!
//! | Variant | Rust Type | Column types |
//! |---------|-----------|--------------|
//! | Null | - | any null cell, NULL columns |
//! | Bool | bool | BOOL |
//! | TinyInt..BigInt | i8..i64 | TINYINT..BIGINT |
//! | UTinyInt..UBigInt | u8..u64 | unsigned integers |
//! | Float / Double | f32 / f64 | FLOAT / DOUBLE |
//! | Timestamp | T | TIMESTAMP |
//! | Bytes | Vec<u8> | VARCHAR, JSON, VARBINARY, GEOMETRY |
//! | String | String | NCHAR |

use chrono::{DateTime, Utc};

use crate::error::Result;

/// One decoded row, in column order.
pub type Row<T = DateTime<Utc>> = Vec<Value<T>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value<T = DateTime<Utc>> {
    Null,
    Bool(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    UTinyInt(u8),
    USmallInt(u16),
    UInt(u32),
    UBigInt(u64),
    Float(f32),
    Double(f64),
    Timestamp(T),
    Bytes(Vec<u8>),
    String(String),
}

impl<T> Value<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text view of a string cell, or of a byte cell holding valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Widens any integer cell to `i128`, which holds every signed and unsigned variant.
    pub fn as_i128(&self) -> Option<i128> {
        Some(match *self {
            Value::TinyInt(v) => v as i128,
            Value::SmallInt(v) => v as i128,
            Value::Int(v) => v as i128,
            Value::BigInt(v) => v as i128,
            Value::UTinyInt(v) => v as i128,
            Value::USmallInt(v) => v as i128,
            Value::UInt(v) => v as i128,
            Value::UBigInt(v) => v as i128,
            _ => return None,
        })
    }

    /// Parses a JSON column payload. Null cells map to `serde_json::Value::Null`.
    pub fn to_json(&self) -> Result<Option<serde_json::Value>> {
        match self {
            Value::Null => Ok(Some(serde_json::Value::Null)),
            Value::Bytes(b) => Ok(Some(serde_json::from_slice(b)?)),
            Value::String(s) => Ok(Some(serde_json::from_str(s)?)),
            _ => Ok(None),
        }
    }
}
