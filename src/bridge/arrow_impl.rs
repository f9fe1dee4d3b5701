// In: src/bridge/arrow_impl.rs

//! Conversion of a parsed raw block into an Arrow `RecordBatch`.
//!
//! Columns are built one at a time straight from the block's column views, so
//! no intermediate row matrix is materialised. Timestamps keep their raw ticks
//! and the Arrow time unit is taken from the block's precision.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BinaryBuilder, BooleanBuilder, Float32Builder, Float64Builder, Int16Builder,
    Int32Builder, Int64Builder, Int8Builder, NullArray, StringBuilder, TimestampMicrosecondBuilder,
    TimestampMillisecondBuilder, TimestampNanosecondBuilder, TimestampSecondBuilder, UInt16Builder,
    UInt32Builder, UInt64Builder, UInt8Builder,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::{RawBlockError, Result};
use crate::raw_block::RawBlock;
use crate::traits::RawTicks;
use crate::types::{Precision, TaosDataType, Value};

/// The Arrow type a column of `ty` is converted to.
pub fn arrow_type(ty: TaosDataType, precision: Precision) -> DataType {
    match ty {
        TaosDataType::Null => DataType::Null,
        TaosDataType::Bool => DataType::Boolean,
        TaosDataType::TinyInt => DataType::Int8,
        TaosDataType::SmallInt => DataType::Int16,
        TaosDataType::Int => DataType::Int32,
        TaosDataType::BigInt => DataType::Int64,
        TaosDataType::UTinyInt => DataType::UInt8,
        TaosDataType::USmallInt => DataType::UInt16,
        TaosDataType::UInt => DataType::UInt32,
        TaosDataType::UBigInt => DataType::UInt64,
        TaosDataType::Float => DataType::Float32,
        TaosDataType::Double => DataType::Float64,
        TaosDataType::Timestamp => DataType::Timestamp(time_unit(precision), None),
        TaosDataType::NChar => DataType::Utf8,
        TaosDataType::Binary
        | TaosDataType::Json
        | TaosDataType::VarBinary
        | TaosDataType::Geometry => DataType::Binary,
    }
}

fn time_unit(precision: Precision) -> TimeUnit {
    match precision {
        Precision::Second => TimeUnit::Second,
        Precision::Millisecond => TimeUnit::Millisecond,
        Precision::Microsecond => TimeUnit::Microsecond,
        Precision::Nanosecond => TimeUnit::Nanosecond,
    }
}

/// Fills an Arrow builder from one column. Cells that do not match `$pat` are null.
macro_rules! build_column {
    ($builder:ty, $block:expr, $col:expr, $pat:pat => $val:expr) => {{
        let mut builder = <$builder>::with_capacity($block.row_count());
        for row in 0..$block.row_count() {
            match $block.decode_cell_with(row, $col, &RawTicks)? {
                $pat => builder.append_value($val),
                _ => builder.append_null(),
            }
        }
        Arc::new(builder.finish()) as ArrayRef
    }};
}

/// Same as `build_column!` for byte-oriented builders, which also take a data capacity.
macro_rules! build_var_column {
    ($builder:ty, $block:expr, $col:expr, $pat:pat => $val:expr) => {{
        let data_capacity = $block.column($col).map_or(0, |view| view.data.len());
        let mut builder = <$builder>::with_capacity($block.row_count(), data_capacity);
        for row in 0..$block.row_count() {
            match $block.decode_cell_with(row, $col, &RawTicks)? {
                $pat => builder.append_value($val),
                _ => builder.append_null(),
            }
        }
        Arc::new(builder.finish()) as ArrayRef
    }};
}

/// Converts one column of `block` into an Arrow array.
pub fn column_to_array(block: &RawBlock<'_>, col: usize) -> Result<ArrayRef> {
    let ty = block
        .column(col)
        .map(|view| view.ty)
        .ok_or_else(|| RawBlockError::corrupt(format!("column index {} out of range", col)))?;
    let precision = block.precision();

    Ok(match ty {
        TaosDataType::Null => Arc::new(NullArray::new(block.row_count())) as ArrayRef,
        TaosDataType::Bool => build_column!(BooleanBuilder, block, col, Value::Bool(v) => v),
        TaosDataType::TinyInt => build_column!(Int8Builder, block, col, Value::TinyInt(v) => v),
        TaosDataType::SmallInt => build_column!(Int16Builder, block, col, Value::SmallInt(v) => v),
        TaosDataType::Int => build_column!(Int32Builder, block, col, Value::Int(v) => v),
        TaosDataType::BigInt => build_column!(Int64Builder, block, col, Value::BigInt(v) => v),
        TaosDataType::UTinyInt => build_column!(UInt8Builder, block, col, Value::UTinyInt(v) => v),
        TaosDataType::USmallInt => build_column!(UInt16Builder, block, col, Value::USmallInt(v) => v),
        TaosDataType::UInt => build_column!(UInt32Builder, block, col, Value::UInt(v) => v),
        TaosDataType::UBigInt => build_column!(UInt64Builder, block, col, Value::UBigInt(v) => v),
        TaosDataType::Float => build_column!(Float32Builder, block, col, Value::Float(v) => v),
        TaosDataType::Double => build_column!(Float64Builder, block, col, Value::Double(v) => v),
        TaosDataType::Timestamp => match precision {
            Precision::Second => {
                build_column!(TimestampSecondBuilder, block, col, Value::Timestamp(t) => t.ticks)
            }
            Precision::Millisecond => {
                build_column!(TimestampMillisecondBuilder, block, col, Value::Timestamp(t) => t.ticks)
            }
            Precision::Microsecond => {
                build_column!(TimestampMicrosecondBuilder, block, col, Value::Timestamp(t) => t.ticks)
            }
            Precision::Nanosecond => {
                build_column!(TimestampNanosecondBuilder, block, col, Value::Timestamp(t) => t.ticks)
            }
        },
        TaosDataType::NChar => build_var_column!(StringBuilder, block, col, Value::String(s) => s),
        TaosDataType::Binary
        | TaosDataType::Json
        | TaosDataType::VarBinary
        | TaosDataType::Geometry => build_var_column!(BinaryBuilder, block, col, Value::Bytes(b) => b),
    })
}

/// Converts a whole block into a `RecordBatch`.
///
/// Field names come from `names` when given (one per column), otherwise `c0`, `c1`, ...
pub fn to_record_batch(block: &RawBlock<'_>, names: Option<&[String]>) -> Result<RecordBatch> {
    let precision = block.precision();
    let mut fields = Vec::with_capacity(block.column_count());
    let mut arrays = Vec::with_capacity(block.column_count());

    for (col, view) in block.columns().iter().enumerate() {
        let name = names
            .and_then(|names| names.get(col).cloned())
            .unwrap_or_else(|| format!("c{}", col));
        fields.push(Field::new(name, arrow_type(view.ty, precision), true));
        arrays.push(column_to_array(block, col)?);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(block.row_count()));
    let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
    log::debug!(
        "converted raw block to record batch: {} rows x {} cols",
        batch.num_rows(),
        batch.num_columns()
    );
    Ok(batch)
}
