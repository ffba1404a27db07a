pub mod block;
pub mod decoders;
pub mod direct;
pub mod io;
pub mod view;

pub use block::BlockColumnarInts;
pub use decoders::{DirectDescriptor, IntFormDecoder, decoder_for};
pub use direct::{DirectColumnarInts, DirectMode};
pub use io::map_column_file;
pub use view::ColumnData;

use crate::engine::errors::ColumnError;


/// Random access over a column's values. Each instance caches the decoded
/// state of a single chunk and is meant to be used by one thread.
pub trait ColumnarInts {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&mut self, index: usize) -> Result<i32, ColumnError>;

    /// Fills `out[..end - start]` with the values in `[start, end)`.
    fn get_range(&mut self, out: &mut [i32], start: usize, end: usize) -> Result<(), ColumnError>;

    /// Fills `out[..indices.len()]` with the values at `indices`, which must
    /// be sorted ascending.
    fn get_gather(&mut self, out: &mut [i32], indices: &[usize]) -> Result<(), ColumnError>;

    /// Chunks decoded so far by this reader.
    fn chunk_loads(&self) -> u64;
}

/// Chunk bookkeeping shared by the reader variants: index arithmetic,
/// bounds checks and the one-chunk cache key.
#[derive(Debug)]
pub(crate) struct ChunkCursor<'a> {
    pub(crate) data: ColumnData<'a>,
    current: Option<usize>,
    loads: u64,
    log: u32,
    mask: usize,
}

impl<'a> ChunkCursor<'a> {
    pub(crate) fn new(data: ColumnData<'a>) -> Self {
        let header = *data.header();
        Self {
            log: header.log_values_per_chunk as u32,
            mask: header.chunk_index_mask(),
            data,
            current: None,
            loads: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Splits a checked index into `(chunk, position within chunk)`.
    #[inline]
    pub(crate) fn locate(&self, index: usize) -> Result<(usize, usize), ColumnError> {
        if index >= self.len() {
            return Err(ColumnError::OutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok((index >> self.log, index & self.mask))
    }

    #[inline]
    pub(crate) fn chunk_end(&self, chunk: usize) -> usize {
        ((chunk + 1) << self.log).min(self.len())
    }

    pub(crate) fn check_range(
        &self,
        out: &[i32],
        start: usize,
        end: usize,
    ) -> Result<(), ColumnError> {
        if start > end || end > self.len() {
            return Err(ColumnError::OutOfRange {
                index: if start > end { start } else { end },
                len: self.len(),
            });
        }
        if out.len() < end - start {
            return Err(ColumnError::State(format!(
                "output buffer of {} values cannot hold range of {}",
                out.len(),
                end - start
            )));
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn is_cached(&self, chunk: usize) -> bool {
        self.current == Some(chunk)
    }

    /// Records a finished load; the previous chunk is implicitly evicted.
    #[inline]
    pub(crate) fn mark_loaded(&mut self, chunk: usize) {
        self.current = Some(chunk);
        self.loads += 1;
    }

    /// Forgets the cached chunk, used when a load fails half way.
    #[inline]
    pub(crate) fn invalidate(&mut self) {
        self.current = None;
    }

    #[inline]
    pub(crate) fn loads(&self) -> u64 {
        self.loads
    }
}
