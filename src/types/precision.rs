//! Timestamp precision and the raw, unconverted timestamp value.

use crate::error::RawBlockError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The unit in which a timestamp column's epoch ticks are counted.
///
/// The first three variants carry the server's precision code. `Second` has no
/// wire code and exists for callers that feed epoch-second data through the
/// decoder themselves.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    #[default]
    Millisecond,
    Microsecond,
    Nanosecond,
    Second,
}

impl Precision {
    /// Number of ticks in one second.
    pub fn ticks_per_second(self) -> i64 {
        match self {
            Precision::Second => 1,
            Precision::Millisecond => 1_000,
            Precision::Microsecond => 1_000_000,
            Precision::Nanosecond => 1_000_000_000,
        }
    }

    /// The server precision code, if this precision has one.
    pub fn code(self) -> Option<u8> {
        match self {
            Precision::Millisecond => Some(0),
            Precision::Microsecond => Some(1),
            Precision::Nanosecond => Some(2),
            Precision::Second => None,
        }
    }
}

impl TryFrom<u8> for Precision {
    type Error = RawBlockError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Precision::Millisecond),
            1 => Ok(Precision::Microsecond),
            2 => Ok(Precision::Nanosecond),
            other => Err(RawBlockError::UnknownPrecision(other)),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Precision::Second => "s",
            Precision::Millisecond => "ms",
            Precision::Microsecond => "us",
            Precision::Nanosecond => "ns",
        })
    }
}

/// An epoch tick count together with the precision it was read at.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
    pub ticks: i64,
    pub precision: Precision,
}
