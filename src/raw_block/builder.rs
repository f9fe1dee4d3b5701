//! Writer for the raw block format.
//!
//! The decoder never needs this, but fixtures, benchmarks and property tests
//! do: it produces the exact byte layout documented in `layout`.
//! Timestamps are given as raw ticks (`Value<i64>`).

use crate::error::{RawBlockError, Result};
use crate::null_handling::bitmap::{bitmap_len, set_null};
use crate::raw_block::layout::{column_data_offset, HEADER_SIZE};
use crate::raw_block::var::{LENGTH_PREFIX_SIZE, NULL_OFFSET};
use crate::types::{ColumnDescriptor, TaosDataType, Value};

#[derive(Debug, Clone)]
struct BuilderColumn {
    ty: TaosDataType,
    cells: Vec<Value<i64>>,
}

#[derive(Debug, Clone)]
pub struct RawBlockBuilder {
    version: i32,
    group_id: u64,
    has_column_segment: i32,
    columns: Vec<BuilderColumn>,
}

impl Default for RawBlockBuilder {
    fn default() -> Self {
        Self {
            version: 1,
            group_id: 0,
            has_column_segment: 0,
            columns: Vec::new(),
        }
    }
}

impl RawBlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn group_id(mut self, group_id: u64) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn has_column_segment(mut self, flag: i32) -> Self {
        self.has_column_segment = flag;
        self
    }

    /// Appends a column. `Value::Null` cells become nulls.
    pub fn column(mut self, ty: TaosDataType, cells: Vec<Value<i64>>) -> Self {
        self.columns.push(BuilderColumn { ty, cells });
        self
    }

    /// Descriptors matching what `build` writes into the column-info array.
    pub fn descriptors(&self) -> Vec<ColumnDescriptor> {
        self.columns
            .iter()
            .map(|c| ColumnDescriptor::new(c.ty, declared_width(c)))
            .collect()
    }

    /// Serializes the block.
    pub fn build(&self) -> Result<Vec<u8>> {
        let rows = self.columns.first().map_or(0, |c| c.cells.len());
        if let Some(bad) = self.columns.iter().find(|c| c.cells.len() != rows) {
            return Err(RawBlockError::corrupt(format!(
                "{} column has {} cells, expected {}",
                bad.ty,
                bad.cells.len(),
                rows
            )));
        }

        let regions = self
            .columns
            .iter()
            .map(|c| encode_column(c, rows))
            .collect::<Result<Vec<_>>>()?;

        let cols = self.columns.len();
        let body_len: usize = regions.iter().map(|(prefix, data)| prefix.len() + data.len()).sum();
        let total = column_data_offset(cols) + body_len;
        let mut out = Vec::with_capacity(total);

        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&(total as i32).to_le_bytes());
        out.extend_from_slice(&(rows as i32).to_le_bytes());
        out.extend_from_slice(&(cols as i32).to_le_bytes());
        out.extend_from_slice(&self.has_column_segment.to_le_bytes());
        out.extend_from_slice(&self.group_id.to_le_bytes());
        debug_assert_eq!(out.len(), HEADER_SIZE);

        for column in &self.columns {
            out.push(column.ty.code());
            out.extend_from_slice(&declared_width(column).to_le_bytes());
        }
        for (_, data) in &regions {
            out.extend_from_slice(&(data.len() as i32).to_le_bytes());
        }
        for (prefix, data) in regions {
            out.extend(prefix);
            out.extend(data);
        }
        Ok(out)
    }
}

fn declared_width(column: &BuilderColumn) -> i32 {
    match column.ty.fixed_width() {
        Some(width) => width as i32,
        None => {
            let widest = column
                .cells
                .iter()
                .filter_map(|cell| var_content(column.ty, cell).ok().flatten())
                .map(|content| content.len())
                .max()
                .unwrap_or(0);
            (widest + LENGTH_PREFIX_SIZE) as i32
        }
    }
}

/// Returns `(prefix, data)` for one column.
fn encode_column(column: &BuilderColumn, rows: usize) -> Result<(Vec<u8>, Vec<u8>)> {
    if column.ty.is_var_data() {
        let mut offsets = Vec::with_capacity(rows * 4);
        let mut payload = Vec::new();
        for cell in &column.cells {
            match var_content(column.ty, cell)? {
                None => offsets.extend_from_slice(&NULL_OFFSET.to_le_bytes()),
                Some(content) => {
                    let len = u16::try_from(content.len()).map_err(|_| {
                        RawBlockError::corrupt(format!("{} byte cell exceeds u16 length", content.len()))
                    })?;
                    offsets.extend_from_slice(&(payload.len() as i32).to_le_bytes());
                    payload.extend_from_slice(&len.to_le_bytes());
                    payload.extend(content);
                }
            }
        }
        Ok((offsets, payload))
    } else {
        let mut bitmap = vec![0u8; bitmap_len(rows)];
        let mut values = Vec::new();
        for (row, cell) in column.cells.iter().enumerate() {
            let null = encode_fixed_cell(column.ty, cell, &mut values)?;
            set_null(&mut bitmap, row, null);
        }
        Ok((bitmap, values))
    }
}

/// Appends the packed value and reports whether the cell is null.
fn encode_fixed_cell(ty: TaosDataType, cell: &Value<i64>, out: &mut Vec<u8>) -> Result<bool> {
    match (ty, cell) {
        (_, Value::Null) | (TaosDataType::Null, _) => {
            let width = ty.fixed_width().unwrap_or(0);
            out.extend(std::iter::repeat(0u8).take(width));
            return Ok(true);
        }
        (TaosDataType::Bool, Value::Bool(v)) => out.push(u8::from(*v)),
        (TaosDataType::TinyInt, Value::TinyInt(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TaosDataType::SmallInt, Value::SmallInt(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TaosDataType::Int, Value::Int(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TaosDataType::BigInt, Value::BigInt(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TaosDataType::UTinyInt, Value::UTinyInt(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TaosDataType::USmallInt, Value::USmallInt(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TaosDataType::UInt, Value::UInt(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TaosDataType::UBigInt, Value::UBigInt(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (TaosDataType::Float, Value::Float(v)) => out.extend_from_slice(&v.to_bits().to_le_bytes()),
        (TaosDataType::Double, Value::Double(v)) => out.extend_from_slice(&v.to_bits().to_le_bytes()),
        (TaosDataType::Timestamp, Value::Timestamp(t)) => out.extend_from_slice(&t.to_le_bytes()),
        (ty, cell) => {
            return Err(RawBlockError::corrupt(format!(
                "cannot store {:?} in a {} column",
                cell, ty
            )))
        }
    }
    Ok(false)
}

/// The record content for a variable-width cell, `None` for null.
fn var_content(ty: TaosDataType, cell: &Value<i64>) -> Result<Option<Vec<u8>>> {
    match (ty, cell) {
        (_, Value::Null) => Ok(None),
        (TaosDataType::NChar, Value::String(s)) => {
            Ok(Some(s.chars().flat_map(|c| (c as u32).to_le_bytes()).collect()))
        }
        (_, Value::Bytes(b)) if ty != TaosDataType::NChar => Ok(Some(b.clone())),
        (_, Value::String(s)) if ty != TaosDataType::NChar => Ok(Some(s.as_bytes().to_vec())),
        (ty, cell) => Err(RawBlockError::corrupt(format!(
            "cannot store {:?} in a {} column",
            cell, ty
        ))),
    }
}
