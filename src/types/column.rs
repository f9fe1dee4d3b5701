//! Column descriptors: the caller-supplied per-column metadata used to decode a
//! block, and the richer schema records carried by change-stream envelopes.

use serde::{Deserialize, Serialize};

use crate::error::{RawBlockError, Result};
use crate::types::TaosDataType;

/// Type tag and declared byte width of one column, in column order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub type_tag: u8,
    pub declared_width: i32,
}

impl ColumnDescriptor {
    pub fn new(ty: TaosDataType, declared_width: i32) -> Self {
        Self {
            type_tag: ty.code(),
            declared_width,
        }
    }

    /// Descriptor for a fixed-width type, using the type's natural width.
    pub fn fixed(ty: TaosDataType) -> Self {
        Self::new(ty, ty.fixed_width().unwrap_or(0) as i32)
    }

    /// Resolves the type tag, failing with `UnknownType` for unrecognised codes.
    pub fn data_type(&self) -> Result<TaosDataType> {
        TaosDataType::try_from(self.type_tag)
    }
}

/// One column record of an envelope schema.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    pub type_tag: u8,
    pub flag: i8,
    pub byte_size: i64,
    pub column_id: i32,
    pub name: String,
}

impl SchemaColumn {
    /// Fails with `CorruptBlock` when the byte size does not fit a declared width.
    pub fn descriptor(&self) -> Result<ColumnDescriptor> {
        let declared_width = i32::try_from(self.byte_size).map_err(|_| {
            RawBlockError::corrupt(format!(
                "schema column {} has byte size {}",
                self.name, self.byte_size
            ))
        })?;
        Ok(ColumnDescriptor {
            type_tag: self.type_tag,
            declared_width,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RawBlockError;

    fn schema_column(byte_size: i64) -> SchemaColumn {
        SchemaColumn {
            type_tag: TaosDataType::Binary.code(),
            flag: 0,
            byte_size,
            column_id: 3,
            name: "location".to_string(),
        }
    }

    #[test]
    fn test_descriptor_keeps_byte_size() {
        let descriptor = schema_column(66).descriptor().unwrap();
        assert_eq!(descriptor, ColumnDescriptor::new(TaosDataType::Binary, 66));
    }

    #[test]
    fn test_descriptor_rejects_oversized_byte_size() {
        for byte_size in [i32::MAX as i64 + 1, i64::MIN] {
            assert!(matches!(
                schema_column(byte_size).descriptor(),
                Err(RawBlockError::CorruptBlock(_))
            ));
        }
    }
}
