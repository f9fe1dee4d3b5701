//! Variable-width column decoding.
//!
//! A variable-width region is an `i32` offset table (one entry per row, `-1`
//! for null) followed by the payload. Each non-null entry points at a record
//! inside the payload: a little-endian `u16` byte length and then that many
//! content bytes. NCHAR content is a run of 4-byte code points.

use crate::config::NcharPolicy;
use crate::error::{RawBlockError, Result};
use crate::raw_block::layout::OFFSET_ENTRY_SIZE;
use crate::types::{TaosDataType, Value};
use crate::utils::{read_int_at, slice_at};

/// Marker stored in the offset table for a null cell.
pub const NULL_OFFSET: i32 = -1;
/// Size of the length prefix in front of every record.
pub const LENGTH_PREFIX_SIZE: usize = 2;
/// Bytes per NCHAR code unit.
pub const NCHAR_UNIT_SIZE: usize = 4;

/// Returns the raw record content for `row`, or `None` for a null cell.
///
/// # Errors
/// `CorruptBlock` if the offset is negative but not `-1`, or if the record
/// extends past the payload.
pub fn record_at<'a>(offsets: &[u8], payload: &'a [u8], row: usize) -> Result<Option<&'a [u8]>> {
    let offset = read_int_at::<i32>(offsets, row * OFFSET_ENTRY_SIZE)?;
    if offset == NULL_OFFSET {
        return Ok(None);
    }
    let start = usize::try_from(offset)
        .map_err(|_| RawBlockError::corrupt(format!("row {} has offset {}", row, offset)))?;

    let out_of_range = |needed: usize| {
        RawBlockError::corrupt(format!(
            "row {} record at {} needs {} bytes, payload is {} bytes",
            row,
            start,
            needed,
            payload.len()
        ))
    };

    let len = read_int_at::<u16>(payload, start).map_err(|_| out_of_range(LENGTH_PREFIX_SIZE))? as usize;
    slice_at(payload, start + LENGTH_PREFIX_SIZE, len)
        .map(Some)
        .map_err(|_| out_of_range(LENGTH_PREFIX_SIZE + len))
}

/// Decodes NCHAR content: `len / 4` little-endian code points.
pub fn decode_nchar(content: &[u8], policy: NcharPolicy) -> Result<String> {
    if content.len() % NCHAR_UNIT_SIZE != 0 {
        return Err(RawBlockError::corrupt(format!(
            "nchar length {} is not a multiple of {}",
            content.len(),
            NCHAR_UNIT_SIZE
        )));
    }

    let mut text = String::with_capacity(content.len() / NCHAR_UNIT_SIZE);
    for unit in content.chunks_exact(NCHAR_UNIT_SIZE) {
        let code = read_int_at::<u32>(unit, 0)?;
        match (char::from_u32(code), policy) {
            (Some(c), _) => text.push(c),
            (None, NcharPolicy::Replace) => {
                log::warn!("replacing invalid nchar code point {:#x}", code);
                text.push(char::REPLACEMENT_CHARACTER);
            }
            (None, NcharPolicy::Strict) => {
                return Err(RawBlockError::corrupt(format!(
                    "invalid nchar code point {:#x}",
                    code
                )))
            }
        }
    }
    Ok(text)
}

/// Decodes the cell for `row` of a variable-width column.
pub fn decode_var<T>(
    offsets: &[u8],
    payload: &[u8],
    row: usize,
    ty: TaosDataType,
    policy: NcharPolicy,
) -> Result<Value<T>> {
    let Some(content) = record_at(offsets, payload, row)? else {
        return Ok(Value::Null);
    };
    match ty {
        TaosDataType::NChar => Ok(Value::String(decode_nchar(content, policy)?)),
        TaosDataType::Binary | TaosDataType::Json | TaosDataType::VarBinary | TaosDataType::Geometry => {
            Ok(Value::Bytes(content.to_vec()))
        }
        _ => Err(RawBlockError::corrupt(format!(
            "{} is not a variable-width type",
            ty
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(entries: &[i32]) -> Vec<u8> {
        entries.iter().flat_map(|o| o.to_le_bytes()).collect()
    }

    fn nchar_record(text: &str) -> Vec<u8> {
        let units: Vec<u8> = text.chars().flat_map(|c| (c as u32).to_le_bytes()).collect();
        let mut out = (units.len() as u16).to_le_bytes().to_vec();
        out.extend(units);
        out
    }

    #[test]
    fn test_null_offset_is_null() {
        let v: Value<()> = decode_var(&offsets(&[-1]), &[], 0, TaosDataType::Binary, NcharPolicy::Strict).unwrap();
        assert!(v.is_null());
    }

    #[test]
    fn test_binary_record() {
        let payload = [2u8, 0, b'a', b'b', 1, 0, b'z'];
        let offs = offsets(&[4, 0]);
        let v: Value<()> = decode_var(&offs, &payload, 1, TaosDataType::Binary, NcharPolicy::Strict).unwrap();
        assert_eq!(v, Value::Bytes(b"ab".to_vec()));
        let v: Value<()> = decode_var(&offs, &payload, 0, TaosDataType::VarBinary, NcharPolicy::Strict).unwrap();
        assert_eq!(v, Value::Bytes(b"z".to_vec()));
    }

    #[test]
    fn test_nchar_two_units_and_empty() {
        let mut payload = nchar_record("数据");
        let second = payload.len() as i32;
        payload.extend([0u8, 0]);
        assert_eq!(payload[0], 8);

        let offs = offsets(&[0, second]);
        let v: Value<()> = decode_var(&offs, &payload, 0, TaosDataType::NChar, NcharPolicy::Strict).unwrap();
        assert_eq!(v, Value::String("数据".to_string()));
        let v: Value<()> = decode_var(&offs, &payload, 1, TaosDataType::NChar, NcharPolicy::Strict).unwrap();
        assert_eq!(v, Value::String(String::new()));
    }

    #[test]
    fn test_negative_offset_other_than_null_is_corrupt() {
        let err = record_at(&offsets(&[-2]), &[0, 0], 0).unwrap_err();
        assert!(matches!(err, RawBlockError::CorruptBlock(_)));
    }

    #[test]
    fn test_record_past_payload_is_corrupt() {
        // Claims 5 bytes of content but only 3 follow.
        let payload = [5u8, 0, 1, 2, 3];
        let err = record_at(&offsets(&[0]), &payload, 0).unwrap_err();
        assert!(matches!(err, RawBlockError::CorruptBlock(_)));
        // Offset points at the last byte, no room for the length prefix.
        let err = record_at(&offsets(&[4]), &payload, 0).unwrap_err();
        assert!(matches!(err, RawBlockError::CorruptBlock(_)));
    }

    #[test]
    fn test_nchar_policies() {
        let bad = 0xD800u32.to_le_bytes();
        assert!(matches!(
            decode_nchar(&bad, NcharPolicy::Strict),
            Err(RawBlockError::CorruptBlock(_))
        ));
        assert_eq!(decode_nchar(&bad, NcharPolicy::Replace).unwrap(), "\u{FFFD}");
        assert!(decode_nchar(&[0, 0, 0], NcharPolicy::Replace).is_err());
    }
}
