//! This module defines the canonical, type-safe representation of the column
//! type tags carried in raw blocks and envelope schemas.

use crate::error::RawBlockError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The column types a raw block can carry, keyed by their wire type code.
///
/// Dispatch over this enum is an exhaustive `match`, so adding a variant forces
/// every decoder to handle it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TaosDataType {
    Null = 0,
    Bool = 1,
    TinyInt = 2,
    SmallInt = 3,
    Int = 4,
    BigInt = 5,
    Float = 6,
    Double = 7,
    /// Also known as VARCHAR on the server side.
    Binary = 8,
    Timestamp = 9,
    NChar = 10,
    UTinyInt = 11,
    USmallInt = 12,
    UInt = 13,
    UBigInt = 14,
    Json = 15,
    VarBinary = 16,
    Geometry = 20,
}

impl TaosDataType {
    /// The wire type code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns `true` for columns stored as an offset table plus payload.
    pub fn is_var_data(self) -> bool {
        matches!(
            self,
            Self::Binary | Self::NChar | Self::Json | Self::VarBinary | Self::Geometry
        )
    }

    /// Byte width of one packed value for fixed-width columns, `None` for
    /// variable-width ones.
    pub fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Null | Self::Bool | Self::TinyInt | Self::UTinyInt => Some(1),
            Self::SmallInt | Self::USmallInt => Some(2),
            Self::Int | Self::UInt | Self::Float => Some(4),
            Self::BigInt | Self::UBigInt | Self::Double | Self::Timestamp => Some(8),
            Self::Binary | Self::NChar | Self::Json | Self::VarBinary | Self::Geometry => None,
        }
    }

    /// Server-side SQL name of the type.
    pub fn sql_name(self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool => "BOOL",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Binary => "VARCHAR",
            Self::Timestamp => "TIMESTAMP",
            Self::NChar => "NCHAR",
            Self::UTinyInt => "TINYINT UNSIGNED",
            Self::USmallInt => "SMALLINT UNSIGNED",
            Self::UInt => "INT UNSIGNED",
            Self::UBigInt => "BIGINT UNSIGNED",
            Self::Json => "JSON",
            Self::VarBinary => "VARBINARY",
            Self::Geometry => "GEOMETRY",
        }
    }
}

impl TryFrom<u8> for TaosDataType {
    type Error = RawBlockError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Null,
            1 => Self::Bool,
            2 => Self::TinyInt,
            3 => Self::SmallInt,
            4 => Self::Int,
            5 => Self::BigInt,
            6 => Self::Float,
            7 => Self::Double,
            8 => Self::Binary,
            9 => Self::Timestamp,
            10 => Self::NChar,
            11 => Self::UTinyInt,
            12 => Self::USmallInt,
            13 => Self::UInt,
            14 => Self::UBigInt,
            15 => Self::Json,
            16 => Self::VarBinary,
            20 => Self::Geometry,
            other => return Err(RawBlockError::UnknownType(other)),
        })
    }
}

impl fmt::Display for TaosDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_roundtrip_through_try_from() {
        for code in 0u8..=32 {
            match TaosDataType::try_from(code) {
                Ok(ty) => assert_eq!(ty.code(), code),
                Err(RawBlockError::UnknownType(c)) => assert_eq!(c, code),
                Err(e) => panic!("unexpected error {e}"),
            }
        }
    }

    #[test]
    fn test_decimal_and_blob_codes_are_rejected() {
        for code in [17u8, 18, 19, 21, 255] {
            assert!(matches!(
                TaosDataType::try_from(code),
                Err(RawBlockError::UnknownType(_))
            ));
        }
    }

    #[test]
    fn test_var_data_has_no_fixed_width() {
        assert!(TaosDataType::NChar.is_var_data());
        assert_eq!(TaosDataType::NChar.fixed_width(), None);
        assert_eq!(TaosDataType::Timestamp.fixed_width(), Some(8));
        assert!(!TaosDataType::Bool.is_var_data());
    }
}
