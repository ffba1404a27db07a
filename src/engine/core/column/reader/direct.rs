use std::ptr;

use tracing::{Level, trace};

use super::decoders::{DirectDescriptor, decoder_for};
use super::view::ColumnData;
use super::{ChunkCursor, ColumnarInts};
use crate::engine::core::column::format::{ByteOrder, DecodeStrategy};
use crate::engine::errors::ColumnError;

/// Decode strategies a direct reader runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectMode {
    Buffer,
    Unsafe,
}

impl DirectMode {
    /// `None` for block decoding.
    pub fn from_strategy(strategy: DecodeStrategy) -> Option<Self> {
        match strategy {
            DecodeStrategy::Block => None,
            DecodeStrategy::Buffer => Some(DirectMode::Buffer),
            DecodeStrategy::Unsafe => Some(DirectMode::Unsafe),
        }
    }
}

impl From<DirectMode> for DecodeStrategy {
    fn from(mode: DirectMode) -> Self {
        match mode {
            DirectMode::Buffer => DecodeStrategy::Buffer,
            DirectMode::Unsafe => DecodeStrategy::Unsafe,
        }
    }
}

/// Reader that never materializes a chunk: each lookup is computed from the
/// cached chunk's descriptor.
///
/// In buffer mode values are read through bounds-checked slices. In unsafe
/// mode they are read through a raw pointer into the region; the pointer is
/// derived from the `'a` borrow and only dereferenced for positions inside
/// the payload whose length the decoder validated.
pub struct DirectColumnarInts<'a> {
    cursor: ChunkCursor<'a>,
    mode: DirectMode,
    order: ByteOrder,
    bytes_per_value: usize,
    constant: i32,
    payload: &'a [u8],
    base: *const u8,
}

impl<'a> DirectColumnarInts<'a> {
    pub fn new(data: ColumnData<'a>, mode: DirectMode) -> Self {
        let order = data.header().byte_order;
        Self {
            cursor: ChunkCursor::new(data),
            mode,
            order,
            bytes_per_value: 0,
            constant: 0,
            payload: &[],
            base: ptr::null(),
        }
    }

    pub fn mode(&self) -> DirectMode {
        self.mode
    }

    fn load(&mut self, chunk: usize) -> Result<(), ColumnError> {
        if self.cursor.is_cached(chunk) {
            return Ok(());
        }
        self.cursor.invalidate();

        let data = &self.cursor.data;
        let bytes = data.chunk(chunk)?;
        let count = data.header().chunk_value_count(chunk);
        let decoder = decoder_for(bytes[0])?;

        match self.mode {
            DirectMode::Unsafe => {
                let d = decoder.transform_unsafe(bytes, count, self.order)?;
                self.bytes_per_value = d.bytes_per_value;
                self.constant = d.constant;
                self.base = d.base;
                self.payload = bytes;
            }
            DirectMode::Buffer => {
                let DirectDescriptor {
                    bytes_per_value,
                    base_offset,
                    constant,
                } = decoder.transform_buffer(bytes, count, self.order)?;
                self.bytes_per_value = bytes_per_value;
                self.constant = constant;
                self.payload = &bytes[base_offset..];
            }
        }

        if tracing::enabled!(Level::TRACE) {
            trace!(
                target: "codec::reader::direct",
                chunk,
                count,
                mode = ?self.mode,
                codec = %decoder.codec(),
                bytes_per_value = self.bytes_per_value,
                "Loaded chunk"
            );
        }
        self.cursor.mark_loaded(chunk);
        Ok(())
    }

    #[inline]
    fn value(&self, within: usize) -> i32 {
        let width = self.bytes_per_value;
        if width == 0 {
            return self.constant;
        }
        match self.mode {
            // SAFETY: `within` is below the chunk's value count and the
            // payload behind `base` was checked to hold `count * width` bytes.
            DirectMode::Unsafe => unsafe {
                read_raw(self.base.add(within * width), width, self.order)
            },
            DirectMode::Buffer => {
                let at = within * width;
                self.order.read_value(&self.payload[at..at + width])
            }
        }
    }

    fn fill(&self, within: usize, out: &mut [i32]) {
        if self.bytes_per_value == 0 {
            out.fill(self.constant);
            return;
        }
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.value(within + i);
        }
    }
}

/// # Safety
///
/// `ptr` must be valid for reads of `width` bytes, `1 <= width <= 4`.
#[inline]
unsafe fn read_raw(ptr: *const u8, width: usize, order: ByteOrder) -> i32 {
    if width == 4 {
        // SAFETY: caller guarantees four readable bytes.
        let word = unsafe { ptr::read_unaligned(ptr as *const [u8; 4]) };
        return match order {
            ByteOrder::Little => i32::from_le_bytes(word),
            ByteOrder::Big => i32::from_be_bytes(word),
        };
    }
    let mut v = 0u32;
    for i in 0..width {
        // SAFETY: caller guarantees `width` readable bytes.
        let b = unsafe { *ptr.add(i) } as u32;
        match order {
            ByteOrder::Little => v |= b << (8 * i),
            ByteOrder::Big => v = (v << 8) | b,
        }
    }
    v as i32
}

impl ColumnarInts for DirectColumnarInts<'_> {
    fn len(&self) -> usize {
        self.cursor.len()
    }

    fn get(&mut self, index: usize) -> Result<i32, ColumnError> {
        let (chunk, within) = self.cursor.locate(index)?;
        self.load(chunk)?;
        Ok(self.value(within))
    }

    fn get_range(&mut self, out: &mut [i32], start: usize, end: usize) -> Result<(), ColumnError> {
        self.cursor.check_range(out, start, end)?;
        let mut pos = start;
        while pos < end {
            let (chunk, within) = self.cursor.locate(pos)?;
            let stop = self.cursor.chunk_end(chunk).min(end);
            self.load(chunk)?;
            self.fill(within, &mut out[pos - start..stop - start]);
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
            *slot = self.value(within);
        }
        Ok(())
    }

    fn chunk_loads(&self) -> u64 {
        self.cursor.loads()
    }
}
