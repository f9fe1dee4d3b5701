//! Incremental row cursor over a parsed block.

use crate::error::Result;
use crate::raw_block::decoder::RawBlock;
use crate::traits::TimestampConverter;
use crate::types::Row;

/// Yields one decoded row per step without materialising the whole block.
///
/// The cursor stops after the first error.
pub struct RowCursor<'b, 'a, C> {
    block: &'b RawBlock<'a>,
    converter: C,
    next: usize,
}

impl<'b, 'a, C> RowCursor<'b, 'a, C>
where
    C: TimestampConverter,
{
    pub(crate) fn new(block: &'b RawBlock<'a>, converter: C) -> Self {
        Self {
            block,
            converter,
            next: 0,
        }
    }

    /// Index of the row the next call to `next` will decode.
    pub fn position(&self) -> usize {
        self.next
    }
}

impl<'b, 'a, C> Iterator for RowCursor<'b, 'a, C>
where
    C: TimestampConverter,
{
    type Item = Result<Row<C::Output>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.block.row_count() {
            return None;
        }
        let row = self.block.decode_row_with(self.next, &self.converter);
        self.next = if row.is_ok() {
            self.next + 1
        } else {
            self.block.row_count()
        };
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.block.row_count().saturating_sub(self.next);
        (0, Some(left))
    }
}
