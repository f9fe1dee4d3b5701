// In: src/raw_block/decoder.rs

//! The row/block decoder.
//!
//! `RawBlock::parse` runs the layout calculation once and slices every column
//! region out of the borrowed buffer. After that, decoding is a read-only walk
//! over those slices: either the whole block (column by column, then
//! transposed into rows) or a single target row.

use chrono::{DateTime, Utc};
use ndarray::Array2;

use crate::config::{DecoderConfig, NcharPolicy};
use crate::error::{RawBlockError, Result};
use crate::null_handling::is_null;
use crate::raw_block::cursor::RowCursor;
use crate::raw_block::fixed::decode_fixed;
use crate::raw_block::layout::{self, BlockHeader, ColumnRegion};
use crate::raw_block::var::decode_var;
use crate::traits::{ChronoConverter, TimestampConverter};
use crate::types::{ColumnDescriptor, Precision, Row, TaosDataType, Value};
use crate::utils::slice_at;

//==================================================================================
// 1. Column Views
//==================================================================================

/// One column's bytes, split into its prefix (bitmap or offset table) and data.
#[derive(Debug, Clone, Copy)]
pub struct ColumnView<'a> {
    pub ty: TaosDataType,
    pub prefix: &'a [u8],
    pub data: &'a [u8],
}

impl<'a> ColumnView<'a> {
    fn from_region(buf: &'a [u8], region: &ColumnRegion) -> Result<Self> {
        Ok(Self {
            ty: region.ty,
            prefix: slice_at(buf, region.start, region.prefix_len)?,
            data: slice_at(buf, region.data_start(), region.data_len)?,
        })
    }

    /// Decodes one cell of this column.
    pub fn decode<C>(
        &self,
        row: usize,
        precision: Precision,
        policy: NcharPolicy,
        converter: &C,
    ) -> Result<Value<C::Output>>
    where
        C: TimestampConverter,
    {
        if self.ty.is_var_data() {
            decode_var(self.prefix, self.data, row, self.ty, policy)
        } else if is_null(self.prefix, row)? {
            Ok(Value::Null)
        } else {
            decode_fixed(self.data, row, self.ty, precision, converter)
        }
    }
}

//==================================================================================
// 2. RawBlock
//==================================================================================

/// A validated view over one raw block.
///
/// The view borrows the buffer, so it cannot outlive the fetch that produced it.
/// Decoded values are owned copies.
#[derive(Debug, Clone)]
pub struct RawBlock<'a> {
    header: BlockHeader,
    row_count: usize,
    precision: Precision,
    nchar_policy: NcharPolicy,
    columns: Vec<ColumnView<'a>>,
}

impl<'a> RawBlock<'a> {
    /// Validates the block in `buf` against `columns` and locates every column region.
    ///
    /// # Errors
    /// `UnknownType` for an unrecognised type tag, `TruncatedBuffer` or
    /// `CorruptBlock` for any region that does not fit the buffer.
    pub fn parse(
        buf: &'a [u8],
        columns: &[ColumnDescriptor],
        precision: Precision,
        config: &DecoderConfig,
    ) -> Result<Self> {
        let types = columns
            .iter()
            .map(ColumnDescriptor::data_type)
            .collect::<Result<Vec<_>>>()?;
        let layout = layout::compute_layout(buf, &types, config)?;
        let views = layout
            .regions
            .iter()
            .map(|region| ColumnView::from_region(buf, region))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "parsed raw block v{}: {} rows x {} cols, {} of {} bytes used, group {}",
            layout.header.version,
            layout.row_count,
            views.len(),
            layout.end,
            buf.len(),
            layout.header.group_id
        );

        Ok(Self {
            header: layout.header,
            row_count: layout.row_count,
            precision,
            nchar_policy: config.nchar_policy,
            columns: views,
        })
    }

    /// Reads the block's own column-info array as descriptors.
    ///
    /// Useful when the caller has no separate metadata for the result.
    pub fn embedded_columns(buf: &[u8]) -> Result<Vec<ColumnDescriptor>> {
        let header = BlockHeader::parse(buf)?;
        Ok(layout::read_column_info(buf, header.columns()?)?
            .into_iter()
            .map(|(type_tag, declared_width)| ColumnDescriptor {
                type_tag,
                declared_width,
            })
            .collect())
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn column(&self, index: usize) -> Option<&ColumnView<'a>> {
        self.columns.get(index)
    }

    pub fn columns(&self) -> &[ColumnView<'a>] {
        &self.columns
    }

    /// Decodes a single cell.
    pub fn decode_cell_with<C>(&self, row: usize, column: usize, converter: &C) -> Result<Value<C::Output>>
    where
        C: TimestampConverter,
    {
        self.check_row(row)?;
        let view = self.columns.get(column).ok_or_else(|| {
            RawBlockError::corrupt(format!(
                "column index {} out of range ({} columns)",
                column,
                self.columns.len()
            ))
        })?;
        view.decode(row, self.precision, self.nchar_policy, converter)
    }

    /// Decodes only `row`, leaving the rest of the block untouched.
    pub fn decode_row_with<C>(&self, row: usize, converter: &C) -> Result<Row<C::Output>>
    where
        C: TimestampConverter,
    {
        self.check_row(row)?;
        self.columns
            .iter()
            .map(|view| view.decode(row, self.precision, self.nchar_policy, converter))
            .collect()
    }

    /// Decodes every row of the block.
    ///
    /// Cells are produced column by column, so the type dispatch happens once
    /// per column, then the column-major matrix is transposed into rows.
    pub fn decode_block_with<C>(&self, converter: &C) -> Result<Vec<Row<C::Output>>>
    where
        C: TimestampConverter,
    {
        let rows = self.row_count;
        let cols = self.columns.len();
        if rows == 0 {
            return Ok(Vec::new());
        }

        let mut cells = Vec::with_capacity(rows * cols);
        for view in &self.columns {
            for row in 0..rows {
                cells.push(view.decode(row, self.precision, self.nchar_policy, converter)?);
            }
        }

        let column_major = Array2::from_shape_vec((cols, rows), cells)?;
        let decoded: Vec<Row<C::Output>> = column_major
            .reversed_axes()
            .outer_iter()
            .map(|row| row.to_vec())
            .collect();

        log_metric!("event"="decode_block", "rows"=rows, "columns"=cols);
        Ok(decoded)
    }

    pub fn decode_row(&self, row: usize) -> Result<Row> {
        self.decode_row_with(row, &ChronoConverter)
    }

    pub fn decode_block(&self) -> Result<Vec<Row>> {
        self.decode_block_with(&ChronoConverter)
    }

    /// A lazy cursor that decodes one row per step.
    pub fn rows(&self) -> RowCursor<'_, 'a, ChronoConverter> {
        RowCursor::new(self, ChronoConverter)
    }

    pub fn rows_with<C>(&self, converter: C) -> RowCursor<'_, 'a, C>
    where
        C: TimestampConverter,
    {
        RowCursor::new(self, converter)
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.row_count {
            return Err(RawBlockError::corrupt(format!(
                "row index {} out of range ({} rows)",
                row, self.row_count
            )));
        }
        Ok(())
    }
}

//==================================================================================
// 3. Stateless Entry Points
//==================================================================================

/// Decodes every row of the block in `buf`, converting timestamps with `chrono`.
pub fn decode_block(
    buf: &[u8],
    columns: &[ColumnDescriptor],
    precision: Precision,
) -> Result<Vec<Row<DateTime<Utc>>>> {
    decode_block_with(buf, columns, precision, &DecoderConfig::default(), &ChronoConverter)
}

/// Decodes only `row_index` of the block in `buf`.
pub fn decode_row(
    buf: &[u8],
    columns: &[ColumnDescriptor],
    row_index: usize,
    precision: Precision,
) -> Result<Row<DateTime<Utc>>> {
    decode_row_with(
        buf,
        columns,
        row_index,
        precision,
        &DecoderConfig::default(),
        &ChronoConverter,
    )
}

pub fn decode_block_with<C>(
    buf: &[u8],
    columns: &[ColumnDescriptor],
    precision: Precision,
    config: &DecoderConfig,
    converter: &C,
) -> Result<Vec<Row<C::Output>>>
where
    C: TimestampConverter,
{
    RawBlock::parse(buf, columns, precision, config)?.decode_block_with(converter)
}

pub fn decode_row_with<C>(
    buf: &[u8],
    columns: &[ColumnDescriptor],
    row_index: usize,
    precision: Precision,
    config: &DecoderConfig,
    converter: &C,
) -> Result<Row<C::Output>>
where
    C: TimestampConverter,
{
    RawBlock::parse(buf, columns, precision, config)?.decode_row_with(row_index, converter)
}
