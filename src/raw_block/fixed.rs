//! Fixed-width column decoding: one packed little-endian value per row.
//!
//! The caller hands in the column's value array (the bytes after its null
//! bitmap) and has already checked the null bit. Every read still goes through
//! the bounds-checked helpers in `utils`.

use crate::error::Result;
use crate::traits::TimestampConverter;
use crate::types::{Precision, TaosDataType, Value};
use crate::utils::read_int_at;

/// Decodes the value for `row` from a fixed-width column's value array.
pub fn decode_fixed<C>(
    values: &[u8],
    row: usize,
    ty: TaosDataType,
    precision: Precision,
    converter: &C,
) -> Result<Value<C::Output>>
where
    C: TimestampConverter,
{
    let at = |width: usize| row * width;
    Ok(match ty {
        TaosDataType::Null => Value::Null,
        TaosDataType::Bool => Value::Bool(read_int_at::<u8>(values, at(1))? != 0),
        TaosDataType::TinyInt => Value::TinyInt(read_int_at(values, at(1))?),
        TaosDataType::SmallInt => Value::SmallInt(read_int_at(values, at(2))?),
        TaosDataType::Int => Value::Int(read_int_at(values, at(4))?),
        TaosDataType::BigInt => Value::BigInt(read_int_at(values, at(8))?),
        TaosDataType::UTinyInt => Value::UTinyInt(read_int_at(values, at(1))?),
        TaosDataType::USmallInt => Value::USmallInt(read_int_at(values, at(2))?),
        TaosDataType::UInt => Value::UInt(read_int_at(values, at(4))?),
        TaosDataType::UBigInt => Value::UBigInt(read_int_at(values, at(8))?),
        TaosDataType::Float => Value::Float(f32::from_bits(read_int_at(values, at(4))?)),
        TaosDataType::Double => Value::Double(f64::from_bits(read_int_at(values, at(8))?)),
        TaosDataType::Timestamp => {
            let ticks: i64 = read_int_at(values, at(8))?;
            Value::Timestamp(converter.convert(ticks, precision)?)
        }
        TaosDataType::Binary
        | TaosDataType::NChar
        | TaosDataType::Json
        | TaosDataType::VarBinary
        | TaosDataType::Geometry => {
            return Err(crate::error::RawBlockError::corrupt(format!(
                "{} is not a fixed-width type",
                ty
            )))
        }
    })
}
