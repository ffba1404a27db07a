use tracing::{Level, trace};

use super::decoders::decoder_for;
use super::view::ColumnData;
use super::{ChunkCursor, ColumnarInts};
use crate::engine::errors::ColumnError;

/// Reader that fully decodes the cached chunk into an owned buffer. Works
/// for every codec and is the only mode for run-length and compressed
/// chunks.
pub struct BlockColumnarInts<'a> {
    cursor: ChunkCursor<'a>,
    values: Vec<i32>,
    scratch: Vec<u8>,
}

impl<'a> BlockColumnarInts<'a> {
    pub fn new(data: ColumnData<'a>) -> Self {
        let per_chunk = data.header().values_per_chunk().min(data.len());
        Self {
            cursor: ChunkCursor::new(data),
            values: Vec::with_capacity(per_chunk),
            scratch: Vec::new(),
        }
    }

    fn load(&mut self, chunk: usize) -> Result<(), ColumnError> {
        if self.cursor.is_cached(chunk) {
            return Ok(());
        }
        self.cursor.invalidate();

        let data = &self.cursor.data;
        let bytes = data.chunk(chunk)?;
        let count = data.header().chunk_value_count(chunk);
        let order = data.header().byte_order;
        let decoder = decoder_for(bytes[0])?;

        self.values.resize(count, 0);
        decoder.transform(bytes, count, order, &mut self.values, &mut self.scratch)?;

        if tracing::enabled!(Level::TRACE) {
            trace!(
                target: "codec::reader::block",
                chunk,
                count,
                codec = %decoder.codec(),
                "Loaded chunk"
            );
        }
        self.cursor.mark_loaded(chunk);
        Ok(())
    }
}

impl ColumnarInts for BlockColumnarInts<'_> {
    fn len(&self) -> usize {
        self.cursor.len()
    }

    fn get(&mut self, index: usize) -> Result<i32, ColumnError> {
        let (chunk, within) = self.cursor.locate(index)?;
        self.load(chunk)?;
        Ok(self.values[within])
    }

    fn get_range(&mut self, out: &mut [i32], start: usize, end: usize) -> Result<(), ColumnError> {
        self.cursor.check_range(out, start, end)?;
        let mut pos = start;
        while pos < end {
            let (chunk, within) = self.cursor.locate(pos)?;
            let stop = self.cursor.chunk_end(chunk).min(end);
            self.load(chunk)?;
            let n = stop - pos;
            out[pos - start..stop - start].copy_from_slice(&self.values[within..within + n]);
            pos = stop;
        }
        Ok(())
    }

    fn get_gather(&mut self, out: &mut [i32], indices: &[usize]) -> Result<(), ColumnError> {
        if out.len() < indices.len() {
            return Err(ColumnError::State(format!(
                "output buffer of {} values cannot hold {} indices",
                out.len(),
                indices.len()
            )));
        }
        for (slot, &index) in out.iter_mut().zip(indices) {
            let (chunk, within) = self.cursor.locate(index)?;
            self.load(chunk)?;
            *slot = self.values[within];
        }
        Ok(())
    }

    fn chunk_loads(&self) -> u64 {
        self.cursor.loads()
    }
}
