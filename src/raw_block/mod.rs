// In: src/raw_block/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Raw Block Decoder
// ====================================================================================
//
// A raw block is one columnar result chunk as handed back by the client library
// after a fetch. The buffer is borrowed, read-only, and only valid for the call.
//
// Data Flow (Decoding):
//
//   1. [RawBlock::parse]        -> Receives `&[u8]` + column descriptors + precision
//         |
//         `-> a. `layout::compute_layout` reads the header and length table once,
//         |       producing a validated `ColumnRegion` per column
//         |
//         `-> b. Each region is sliced into a `ColumnView` (prefix + data)
//
//   2. [decode_block / decode_row / RowCursor]
//         |
//         `-> per cell: `fixed::decode_fixed` (after the bitmap null test)
//         |             or `var::decode_var` (offset table, -1 = null)
//
//   3. -> Returns owned `Value`s; nothing borrows the buffer afterwards.
//
// ====================================================================================
pub mod builder;
pub mod cursor;
pub mod decoder;
pub mod fixed;
pub mod layout;
pub mod var;

pub use builder::RawBlockBuilder;
pub use cursor::RowCursor;
pub use decoder::{decode_block, decode_block_with, decode_row, decode_row_with, ColumnView, RawBlock};
pub use layout::{BlockHeader, BlockLayout, ColumnRegion};
