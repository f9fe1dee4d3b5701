// In: src/envelope/parser.rs

//! Parser for the change-stream envelope that wraps one or more raw blocks.
//!
//! ```text
//! [head: tag(1) + skip, once or twice; or tag >= 100 + len(i32) + skip]
//! [block_count: i32][with_table_name: bool][with_schema: bool]
//! per block:
//!   [block_total_len: varint][reserved: 17][precision: u8][raw block: block_total_len - 18]
//!   [schema: zigzag col_count, zigzag version, col_count x record]   if with_schema
//!   [table name: varint(len + 1), len bytes]                        if with_table_name
//! schema record:
//!   [type: u8][flag: i8][byte_size: zigzag][column_id: zigzag][name: as table name]
//! ```
//!
//! Blocks are only located here. Their payload is decoded later, on demand,
//! through [`BlockInfo::raw_block`] or [`BlockInfo::decode`].

use chrono::{DateTime, Utc};

use crate::config::DecoderConfig;
use crate::error::{RawBlockError, Result};
use crate::kernels::{leb128, zigzag};
use crate::raw_block::RawBlock;
use crate::traits::ChronoConverter;
use crate::types::{ColumnDescriptor, Precision, Row, SchemaColumn};
use crate::utils::ByteCursor;

//==================================================================================
// Format Constants
//==================================================================================
/// Head tags at or above this value carry their own `i32` skip length.
pub const SELF_DESCRIBING_TAG: u8 = 100;
/// Reserved bytes between a block's length and its precision byte.
pub const BLOCK_RESERVED_LEN: usize = 17;
/// Bytes counted by `block_total_len` that precede the raw block itself.
pub const BLOCK_PREAMBLE_LEN: usize = BLOCK_RESERVED_LEN + 1;

//==================================================================================
// Public Structs
//==================================================================================

/// One block located inside an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo<'a> {
    /// The raw block bytes, borrowed from the envelope buffer.
    pub region: &'a [u8],
    /// The server's precision code for this block's timestamps.
    pub precision: u8,
    pub schema: Option<Vec<SchemaColumn>>,
    pub table_name: Option<String>,
}

impl<'a> BlockInfo<'a> {
    pub fn timestamp_precision(&self) -> Result<Precision> {
        Precision::try_from(self.precision)
    }

    /// Column descriptors derived from the embedded schema, if one was sent.
    pub fn columns(&self) -> Result<Option<Vec<ColumnDescriptor>>> {
        self.schema
            .as_ref()
            .map(|schema| schema.iter().map(SchemaColumn::descriptor).collect::<Result<Vec<_>>>())
            .transpose()
    }

    /// Parses the located block. Without explicit `columns` the embedded schema
    /// is used, falling back to the block's own column-info array.
    pub fn raw_block(
        &self,
        columns: Option<&[ColumnDescriptor]>,
        config: &DecoderConfig,
    ) -> Result<RawBlock<'a>> {
        let precision = self.timestamp_precision()?;
        match columns {
            Some(columns) => RawBlock::parse(self.region, columns, precision, config),
            None => {
                let derived = match self.columns()? {
                    Some(columns) => columns,
                    None => RawBlock::embedded_columns(self.region)?,
                };
                RawBlock::parse(self.region, &derived, precision, config)
            }
        }
    }

    /// Decodes every row of the located block with `chrono` timestamps.
    pub fn decode(
        &self,
        columns: Option<&[ColumnDescriptor]>,
        config: &DecoderConfig,
    ) -> Result<Vec<Row<DateTime<Utc>>>> {
        self.raw_block(columns, config)?
            .decode_block_with(&ChronoConverter)
    }
}

//==================================================================================
// Core Implementation
//==================================================================================

/// Walks an envelope buffer and locates every block in it.
pub struct EnvelopeParser<'a, 'c> {
    cursor: ByteCursor<'a>,
    config: &'c DecoderConfig,
}

impl<'a, 'c> EnvelopeParser<'a, 'c> {
    pub fn new(buf: &'a [u8], config: &'c DecoderConfig) -> Self {
        Self {
            cursor: ByteCursor::new(buf),
            config,
        }
    }

    /// Skips the variable-length head, then parses the block list.
    pub fn parse(mut self) -> Result<Vec<BlockInfo<'a>>> {
        self.skip_head()?;
        self.parse_block_infos()
    }

    /// Skips the head: one self-describing segment, or two fixed-width tagged ones.
    pub fn skip_head(&mut self) -> Result<()> {
        let tag = self.cursor.read_u8()?;
        if tag >= SELF_DESCRIBING_TAG {
            let len = self.cursor.read_int::<i32>()?;
            let len = usize::try_from(len)
                .map_err(|_| RawBlockError::corrupt(format!("envelope head length {}", len)))?;
            return self.cursor.skip(len);
        }

        self.cursor.skip(head_skip_len(tag)?)?;
        let tag = self.cursor.read_u8()?;
        self.cursor.skip(head_skip_len(tag)?)
    }

    pub fn parse_block_infos(&mut self) -> Result<Vec<BlockInfo<'a>>> {
        let block_count = self.cursor.read_int::<i32>()?;
        let block_count = usize::try_from(block_count)
            .map_err(|_| RawBlockError::corrupt(format!("envelope block count {}", block_count)))?;
        let with_table_name = self.cursor.read_bool()?;
        let with_schema = self.cursor.read_bool()?;

        log::debug!(
            "envelope: {} blocks, table names: {}, schemas: {}",
            block_count,
            with_table_name,
            with_schema
        );

        // Every block needs at least its varint length and preamble.
        let mut infos = Vec::with_capacity(block_count.min(self.cursor.remaining() / (BLOCK_PREAMBLE_LEN + 1)));
        for index in 0..block_count {
            let block_total_len = leb128::decode_one(&mut self.cursor)?;
            let block_total_len = usize::try_from(block_total_len)
                .ok()
                .filter(|len| *len >= BLOCK_PREAMBLE_LEN)
                .ok_or_else(|| {
                    RawBlockError::corrupt(format!(
                        "block {} total length {} is shorter than its preamble",
                        index, block_total_len
                    ))
                })?;

            self.cursor.skip(BLOCK_RESERVED_LEN)?;
            let precision = self.cursor.read_u8()?;
            let region = self.cursor.read_bytes(block_total_len - BLOCK_PREAMBLE_LEN)?;

            let schema = if with_schema {
                Some(self.parse_schema()?)
            } else {
                None
            };
            let table_name = if with_table_name {
                Some(self.parse_name()?)
            } else {
                None
            };

            log::trace!(
                "envelope block {}: {} bytes, precision {}, table {:?}",
                index,
                region.len(),
                precision,
                table_name
            );
            infos.push(BlockInfo {
                region,
                precision,
                schema,
                table_name,
            });
        }
        Ok(infos)
    }

    /// Reads one schema: column count, a discarded version, then the column records.
    pub fn parse_schema(&mut self) -> Result<Vec<SchemaColumn>> {
        let start = self.cursor.position();
        self.parse_schema_records().map_err(|e| match e {
            RawBlockError::TruncatedBuffer { needed, available, .. } => RawBlockError::IncompleteSchema {
                offset: start,
                needed,
                available,
            },
            other => other,
        })
    }

    fn parse_schema_records(&mut self) -> Result<Vec<SchemaColumn>> {
        let start = self.cursor.position();
        let column_count = zigzag::read_zigzag_varint(&mut self.cursor)?;
        let _version = zigzag::read_zigzag_varint(&mut self.cursor)?;

        let column_count = usize::try_from(column_count)
            .ok()
            .filter(|n| *n <= self.config.max_metadata_len)
            .ok_or(RawBlockError::IncompleteSchema {
                offset: start,
                needed: column_count.unsigned_abs() as usize,
                available: self.cursor.remaining(),
            })?;

        let mut columns = Vec::with_capacity(column_count.min(self.cursor.remaining()));
        for _ in 0..column_count {
            let type_tag = self.cursor.read_u8()?;
            let flag = self.cursor.read_i8()?;
            let byte_size = zigzag::read_zigzag_varint(&mut self.cursor)?;
            let column_id = zigzag::read_zigzag_varint(&mut self.cursor)?;
            let column_id = i32::try_from(column_id)
                .map_err(|_| RawBlockError::corrupt(format!("schema column id {}", column_id)))?;
            let name = self.parse_name()?;
            columns.push(SchemaColumn {
                type_tag,
                flag,
                byte_size,
                column_id,
                name,
            });
        }
        Ok(columns)
    }

    /// Reads a length-prefixed name. The varint counts a terminator that is not sent.
    pub fn parse_name(&mut self) -> Result<String> {
        let offset = self.cursor.position();
        let stored = leb128::decode_one(&mut self.cursor)?;
        let len = usize::try_from(stored).unwrap_or(usize::MAX).saturating_sub(1);

        let available = self.cursor.remaining();
        if len > available || len > self.config.max_metadata_len {
            return Err(RawBlockError::IncompleteName {
                offset,
                needed: len,
                available,
            });
        }
        let bytes = self.cursor.read_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| RawBlockError::corrupt(format!("name at offset {} is not UTF-8: {}", offset, e)))
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }
}

/// Fixed skip width for a non-self-describing head tag.
fn head_skip_len(tag: u8) -> Result<usize> {
    match tag {
        1 => Ok(8),
        2 | 3 => Ok(16),
        other => Err(RawBlockError::UnknownEnvelopeTag(other)),
    }
}

//==================================================================================
// Stateless Entry Points
//==================================================================================

/// Locates every block in an envelope using the default config.
pub fn parse_envelope(buf: &[u8]) -> Result<Vec<BlockInfo<'_>>> {
    parse_envelope_with(buf, &DecoderConfig::default())
}

pub fn parse_envelope_with<'a>(buf: &'a [u8], config: &DecoderConfig) -> Result<Vec<BlockInfo<'a>>> {
    EnvelopeParser::new(buf, config).parse()
}
