//! Byte layout of a raw block.
//!
//! ```text
//! | field              | offset         | size |
//! |--------------------|----------------|------|
//! | version            | 0              | 4    |
//! | total_length       | 4              | 4    |
//! | row_count          | 8              | 4    |
//! | column_count       | 12             | 4    |
//! | has_column_segment | 16             | 4    |
//! | group_id           | 20             | 8    |
//! | column_info[i]     | 28 + 5i        | 5    |  type tag (i8) + declared width (i32)
//! | column_length[i]   | 28 + 5C + 4i   | 4    |
//! | column data        | 28 + 9C        | ...  |
//! ```
//!
//! Each column region is a prefix followed by `column_length[i]` bytes of data:
//! a null bitmap then packed values for fixed-width columns, or a per-row `i32`
//! offset table then length-prefixed records for variable-width ones.
//!
//! The region list is computed once per block, validated against the buffer,
//! and then only read by the column decoders.

use crate::config::DecoderConfig;
use crate::error::{RawBlockError, Result};
use crate::null_handling::bitmap_len;
use crate::types::TaosDataType;
use crate::utils::{read_int_at, slice_at, ByteCursor};

//==================================================================================
// Format Constants
//==================================================================================
pub const HEADER_SIZE: usize = 28;
pub const COLUMN_INFO_SIZE: usize = 5;
pub const COLUMN_LENGTH_SIZE: usize = 4;
/// Width of one variable-width offset table entry.
pub const OFFSET_ENTRY_SIZE: usize = 4;

pub const VERSION_OFFSET: usize = 0;
pub const TOTAL_LENGTH_OFFSET: usize = 4;
pub const ROW_COUNT_OFFSET: usize = 8;
pub const COLUMN_COUNT_OFFSET: usize = 12;
pub const HAS_COLUMN_SEGMENT_OFFSET: usize = 16;
pub const GROUP_ID_OFFSET: usize = 20;

//==================================================================================
// 1. Pure Offset Arithmetic
//==================================================================================

/// Offset of column `index`'s 5-byte info entry.
pub fn column_info_offset(index: usize) -> usize {
    HEADER_SIZE + COLUMN_INFO_SIZE * index
}

/// Offset of the column-length table.
pub fn column_length_offset(column_count: usize) -> usize {
    HEADER_SIZE + COLUMN_INFO_SIZE * column_count
}

/// Offset of the first column's data region.
pub fn column_data_offset(column_count: usize) -> usize {
    column_length_offset(column_count) + COLUMN_LENGTH_SIZE * column_count
}

/// Size of the prefix (bitmap or offset table) in front of a column's data.
pub fn column_prefix_len(ty: TaosDataType, row_count: usize) -> usize {
    if ty.is_var_data() {
        OFFSET_ENTRY_SIZE * row_count
    } else {
        bitmap_len(row_count)
    }
}

//==================================================================================
// 2. Header
//==================================================================================

/// The fixed 28-byte block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub total_length: i32,
    pub row_count: i32,
    pub column_count: i32,
    pub has_column_segment: i32,
    pub group_id: u64,
}

impl BlockHeader {
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(slice_at(buf, 0, HEADER_SIZE)?);
        Ok(Self {
            version: cursor.read_int()?,
            total_length: cursor.read_int()?,
            row_count: cursor.read_int()?,
            column_count: cursor.read_int()?,
            has_column_segment: cursor.read_int()?,
            group_id: cursor.read_int()?,
        })
    }

    /// Row count as a `usize`, rejecting negative values.
    pub fn rows(&self) -> Result<usize> {
        usize::try_from(self.row_count)
            .map_err(|_| RawBlockError::corrupt(format!("negative row count {}", self.row_count)))
    }

    /// Column count as a `usize`, rejecting negative values.
    pub fn columns(&self) -> Result<usize> {
        usize::try_from(self.column_count).map_err(|_| {
            RawBlockError::corrupt(format!("negative column count {}", self.column_count))
        })
    }
}

/// Reads the block's own column-info array: `(type_tag, declared_width)` per column.
pub fn read_column_info(buf: &[u8], column_count: usize) -> Result<Vec<(u8, i32)>> {
    (0..column_count)
        .map(|i| {
            let at = column_info_offset(i);
            Ok((read_int_at::<u8>(buf, at)?, read_int_at::<i32>(buf, at + 1)?))
        })
        .collect()
}

//==================================================================================
// 3. Column Regions
//==================================================================================

/// Where one column's bytes live inside the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRegion {
    pub ty: TaosDataType,
    /// Offset of the bitmap/offset-table prefix.
    pub start: usize,
    pub prefix_len: usize,
    /// The column's entry in the length table.
    pub data_len: usize,
}

impl ColumnRegion {
    pub fn data_start(&self) -> usize {
        self.start + self.prefix_len
    }

    pub fn end(&self) -> usize {
        self.data_start() + self.data_len
    }

    pub fn is_var(&self) -> bool {
        self.ty.is_var_data()
    }
}

/// The validated layout of a whole block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLayout {
    pub header: BlockHeader,
    pub row_count: usize,
    pub regions: Vec<ColumnRegion>,
    /// One past the last byte any column occupies.
    pub end: usize,
}

/// Computes and validates every column region of the block in `buf`.
///
/// `column_length[i]` counts only the column's data bytes. The null bitmap or
/// offset table in front of the data is sized from `row_count` and added on top.
///
/// # Errors
/// * `TruncatedBuffer` when the header, length table or any region extends past `buf`.
/// * `CorruptBlock` when counts are negative, disagree with `types`, a block
///   without columns claims rows, or a region ends past the header's `total_length`.
pub fn compute_layout(
    buf: &[u8],
    types: &[TaosDataType],
    config: &DecoderConfig,
) -> Result<BlockLayout> {
    let header = BlockHeader::parse(buf)?;
    let row_count = header.rows()?;
    let column_count = header.columns()?;

    if column_count != types.len() {
        return Err(RawBlockError::corrupt(format!(
            "block has {} columns but {} descriptors were supplied",
            column_count,
            types.len()
        )));
    }
    // Rows must be backed by column bytes.
    if column_count == 0 && row_count > 0 {
        return Err(RawBlockError::corrupt(format!(
            "block has no columns but claims {} rows",
            row_count
        )));
    }

    let limit = if config.validate_total_length {
        let total = usize::try_from(header.total_length).map_err(|_| {
            RawBlockError::corrupt(format!("negative total length {}", header.total_length))
        })?;
        if total > buf.len() {
            return Err(RawBlockError::TruncatedBuffer {
                offset: 0,
                needed: total,
                available: buf.len(),
            });
        }
        total
    } else {
        buf.len()
    };

    if config.check_column_types {
        for (i, (tag, _)) in read_column_info(buf, column_count)?.into_iter().enumerate() {
            if tag != types[i].code() {
                return Err(RawBlockError::corrupt(format!(
                    "column {} is tagged {} in the block but described as {}",
                    i, tag, types[i]
                )));
            }
        }
    }

    let lengths_at = column_length_offset(column_count);
    let mut start = column_data_offset(column_count);
    let mut regions = Vec::with_capacity(column_count);

    for (i, &ty) in types.iter().enumerate() {
        let raw_len = read_int_at::<i32>(buf, lengths_at + COLUMN_LENGTH_SIZE * i)?;
        let data_len = usize::try_from(raw_len)
            .map_err(|_| RawBlockError::corrupt(format!("column {} has length {}", i, raw_len)))?;

        if let Some(width) = ty.fixed_width() {
            let needed = row_count.saturating_mul(width);
            if data_len < needed {
                return Err(RawBlockError::corrupt(format!(
                    "column {} ({}) holds {} bytes, {} rows need {}",
                    i, ty, data_len, row_count, needed
                )));
            }
        }

        let region = ColumnRegion {
            ty,
            start,
            prefix_len: column_prefix_len(ty, row_count),
            data_len,
        };
        let end = region
            .data_start()
            .checked_add(data_len)
            .ok_or_else(|| RawBlockError::corrupt(format!("column {} length overflows", i)))?;
        if end > buf.len() {
            return Err(RawBlockError::TruncatedBuffer {
                offset: region.start,
                needed: end - region.start,
                available: buf.len().saturating_sub(region.start),
            });
        }
        if end > limit {
            return Err(RawBlockError::corrupt(format!(
                "column {} ends at byte {}, past the block's total length {}",
                i, end, limit
            )));
        }

        log::trace!(
            "column {} ({}): prefix @{} +{}, data +{}",
            i,
            ty,
            region.start,
            region.prefix_len,
            data_len
        );
        regions.push(region);
        start = end;
    }

    Ok(BlockLayout {
        header,
        row_count,
        regions,
        end: start,
    })
}
