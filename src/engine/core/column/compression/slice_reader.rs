use crate::engine::core::column::format::ByteOrder;

pub const SIZE_U8: usize = 1;
pub const SIZE_U32: usize = 4;

/// Forward cursor over a byte slice that honors the column byte order.
pub struct OrderedSliceReader<'a> {
    buf: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> OrderedSliceReader<'a> {
    pub fn new(buf: &'a [u8], order: ByteOrder) -> Self {
        Self { buf, pos: 0, order }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn has_bytes(&self, n: usize) -> bool {
        self.remaining() >= n
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        if !self.has_bytes(SIZE_U8) {
            return None;
        }
        let val = self.buf[self.pos];
        self.pos += SIZE_U8;
        Some(val)
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        self.read_uint(SIZE_U32)
    }

    pub fn read_i32(&mut self) -> Option<i32> {
        self.read_u32().map(|v| v as i32)
    }

    /// Reads an unsigned integer stored in `width` (1..=4) bytes.
    pub fn read_uint(&mut self, width: usize) -> Option<u32> {
        if width == 0 || width > SIZE_U32 || !self.has_bytes(width) {
            return None;
        }
        let val = self.order.read_uint(&self.buf[self.pos..self.pos + width]);
        self.pos += width;
        Some(val)
    }
}
