// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Arrow Bridge
// ====================================================================================
//
// The bridge turns decoded raw blocks into Arrow data for callers that want a
// columnar, owned result instead of `Vec<Row>`.
//
// Data Flow:
//
//   1. [RawBlock] or [BlockInfo]          -> an already validated block view
//         |
//         `-> a. `arrow_impl::arrow_type` maps each column type + block precision
//         |       to an Arrow `DataType` (timestamps keep their raw ticks)
//         |
//         `-> b. `arrow_impl::column_to_array` fills one typed builder per column
//
//   2. [to_record_batch]                  -> Returns an owned `RecordBatch`
//
// ====================================================================================
pub(crate) mod arrow_impl;

pub use arrow_impl::{arrow_type, column_to_array, to_record_batch};

use arrow::record_batch::RecordBatch;

use crate::config::DecoderConfig;
use crate::envelope::BlockInfo;
use crate::error::Result;

/// Converts a block located in an envelope, naming fields after its schema when one was sent.
pub fn block_info_to_record_batch(info: &BlockInfo<'_>, config: &DecoderConfig) -> Result<RecordBatch> {
    let block = info.raw_block(None, config)?;
    let names: Option<Vec<String>> = info
        .schema
        .as_ref()
        .map(|schema| schema.iter().map(|col| col.name.clone()).collect());
    to_record_batch(&block, names.as_deref())
}
