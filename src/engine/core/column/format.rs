use std::fmt;
use std::str::FromStr;

use crate::engine::core::column::compression::OrderedSliceReader;
use crate::engine::errors::ColumnError;

pub const MIN_LOG_VALUES_PER_CHUNK: u8 = 1;
pub const MAX_LOG_VALUES_PER_CHUNK: u8 = 16;
pub const DEFAULT_LOG_VALUES_PER_CHUNK: u8 = 13;

/// Byte order of every multi-byte integer in a column: header counts, offsets
/// table and codec payloads.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    Little = 0,
    Big = 1,
}

impl ByteOrder {
    /// Reads an unsigned integer stored in `bytes.len()` (1..=4) bytes.
    #[inline]
    pub fn read_uint(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::Little => bytes
                .iter()
                .rev()
                .fold(0u32, |acc, &b| (acc << 8) | b as u32),
            ByteOrder::Big => bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32),
        }
    }

    /// Reads a packed value of `bytes.len()` bytes. Four byte values are
    /// signed; narrower widths only ever hold non-negative values.
    #[inline]
    pub fn read_value(self, bytes: &[u8]) -> i32 {
        if let Ok(word) = <[u8; 4]>::try_from(bytes) {
            return match self {
                ByteOrder::Little => i32::from_le_bytes(word),
                ByteOrder::Big => i32::from_be_bytes(word),
            };
        }
        self.read_uint(bytes) as i32
    }

    #[inline]
    pub fn put_i32(self, value: i32, out: &mut Vec<u8>) {
        match self {
            ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    #[inline]
    pub fn put_u32(self, value: u32, out: &mut Vec<u8>) {
        self.put_uint(value, 4, out);
    }

    /// Writes the low `width` bytes of `value`.
    #[inline]
    pub fn put_uint(self, value: u32, width: usize, out: &mut Vec<u8>) {
        match self {
            ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()[..width]),
            ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()[4 - width..]),
        }
    }
}

impl TryFrom<u8> for ByteOrder {
    type Error = ColumnError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(ByteOrder::Little),
            1 => Ok(ByteOrder::Big),
            other => Err(ColumnError::Format(format!(
                "unknown byte order marker {other:#04x}"
            ))),
        }
    }
}

impl From<ByteOrder> for u8 {
    fn from(o: ByteOrder) -> u8 {
        o as u8
    }
}

impl FromStr for ByteOrder {
    type Err = ColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" | "little_endian" => Ok(ByteOrder::Little),
            "big" | "be" | "big_endian" => Ok(ByteOrder::Big),
            other => Err(ColumnError::State(format!("unknown byte order '{other}'"))),
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::Little => f.write_str("little"),
            ByteOrder::Big => f.write_str("big"),
        }
    }
}

/// Reader-side execution mode, persisted in the column header and
/// overridable at open time.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DecodeStrategy {
    Block = 0,
    #[default]
    Buffer = 1,
    Unsafe = 2,
}

impl DecodeStrategy {
    /// Buffer and unsafe readers decode straight from the region without
    /// materializing the chunk.
    #[inline]
    pub fn is_direct(self) -> bool {
        !matches!(self, DecodeStrategy::Block)
    }
}

impl TryFrom<u8> for DecodeStrategy {
    type Error = ColumnError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(DecodeStrategy::Block),
            1 => Ok(DecodeStrategy::Buffer),
            2 => Ok(DecodeStrategy::Unsafe),
            other => Err(ColumnError::Format(format!(
                "unknown decode strategy {other:#04x}"
            ))),
        }
    }
}

impl From<DecodeStrategy> for u8 {
    fn from(s: DecodeStrategy) -> u8 {
        s as u8
    }
}

impl FromStr for DecodeStrategy {
    type Err = ColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "block" => Ok(DecodeStrategy::Block),
            "buffer" => Ok(DecodeStrategy::Buffer),
            "unsafe" => Ok(DecodeStrategy::Unsafe),
            other => Err(ColumnError::State(format!(
                "unknown decode strategy '{other}'"
            ))),
        }
    }
}

impl fmt::Display for DecodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeStrategy::Block => f.write_str("block"),
            DecodeStrategy::Buffer => f.write_str("buffer"),
            DecodeStrategy::Unsafe => f.write_str("unsafe"),
        }
    }
}

/// Chunk codec ids. These bytes are persisted as the first byte of every
/// chunk and must never be renumbered.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntCodec {
    Zero = 0x00,
    Constant = 0x01,
    Unencoded = 0x02,
    BytePack = 0x03,
    RunLength = 0x04,
    Compressed = 0x05,
}

impl IntCodec {
    /// All codecs in tie-break priority order.
    pub const ALL: [IntCodec; 6] = [
        IntCodec::Zero,
        IntCodec::Constant,
        IntCodec::Unencoded,
        IntCodec::BytePack,
        IntCodec::RunLength,
        IntCodec::Compressed,
    ];

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Lower wins when two encoders estimate the same cost.
    #[inline]
    pub fn priority(self) -> u8 {
        self as u8
    }

    /// Whether chunks of this codec can be read through a buffer/unsafe
    /// descriptor instead of a materialized block.
    #[inline]
    pub fn supports_direct(self) -> bool {
        matches!(
            self,
            IntCodec::Zero | IntCodec::Constant | IntCodec::Unencoded | IntCodec::BytePack
        )
    }

    #[inline]
    pub fn supports(self, strategy: DecodeStrategy) -> bool {
        !strategy.is_direct() || self.supports_direct()
    }

    #[inline]
    pub(crate) fn mask(self) -> u8 {
        1 << (self as u8)
    }
}

impl TryFrom<u8> for IntCodec {
    type Error = ColumnError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        IntCodec::ALL
            .get(v as usize)
            .copied()
            .ok_or_else(|| ColumnError::Format(format!("unknown chunk codec {v:#04x}")))
    }
}

impl From<IntCodec> for u8 {
    fn from(c: IntCodec) -> u8 {
        c as u8
    }
}

impl FromStr for IntCodec {
    type Err = ColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zero" => Ok(IntCodec::Zero),
            "constant" => Ok(IntCodec::Constant),
            "unencoded" => Ok(IntCodec::Unencoded),
            "bytepack" | "byte_pack" => Ok(IntCodec::BytePack),
            "runlength" | "run_length" | "rle" => Ok(IntCodec::RunLength),
            "compressed" => Ok(IntCodec::Compressed),
            other => Err(ColumnError::State(format!("unknown codec '{other}'"))),
        }
    }
}

impl fmt::Display for IntCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntCodec::Zero => "zero",
            IntCodec::Constant => "constant",
            IntCodec::Unencoded => "unencoded",
            IntCodec::BytePack => "bytepack",
            IntCodec::RunLength => "runlength",
            IntCodec::Compressed => "compressed",
        };
        f.pad(name)
    }
}

/// Global column header. Field order on disk:
/// byte order | decode strategy | num chunks | num values | log values per
/// chunk | offsets size. Counts use the header's own byte order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnDataHeader {
    pub byte_order: ByteOrder,
    pub decode_strategy: DecodeStrategy,
    pub num_chunks: u32,
    pub num_values: u32,
    pub log_values_per_chunk: u8,
    pub offsets_size: u8,
}

impl ColumnDataHeader {
    pub const LEN: usize = 1 + 1 + 4 + 4 + 1 + 1;

    pub fn new(
        byte_order: ByteOrder,
        decode_strategy: DecodeStrategy,
        num_chunks: u32,
        num_values: u32,
        log_values_per_chunk: u8,
        offsets_size: u8,
    ) -> Self {
        Self {
            byte_order,
            decode_strategy,
            num_chunks,
            num_values,
            log_values_per_chunk,
            offsets_size,
        }
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.push(self.byte_order.into());
        buf.push(self.decode_strategy.into());
        self.byte_order.put_u32(self.num_chunks, buf);
        self.byte_order.put_u32(self.num_values, buf);
        buf.push(self.log_values_per_chunk);
        buf.push(self.offsets_size);
    }

    pub fn read_from(slice: &[u8]) -> Result<Self, ColumnError> {
        if slice.len() < Self::LEN {
            return Err(ColumnError::Format(format!(
                "column too small for header: {} < {}",
                slice.len(),
                Self::LEN
            )));
        }
        let byte_order = ByteOrder::try_from(slice[0])?;
        let decode_strategy = DecodeStrategy::try_from(slice[1])?;

        let mut r = OrderedSliceReader::new(&slice[2..Self::LEN], byte_order);
        let truncated = || ColumnError::Format("truncated column header".into());
        let num_chunks = r.read_u32().ok_or_else(truncated)?;
        let num_values = r.read_u32().ok_or_else(truncated)?;
        let log_values_per_chunk = r.read_u8().ok_or_else(truncated)?;
        let offsets_size = r.read_u8().ok_or_else(truncated)?;

        if !(MIN_LOG_VALUES_PER_CHUNK..=MAX_LOG_VALUES_PER_CHUNK).contains(&log_values_per_chunk)
        {
            return Err(ColumnError::Format(format!(
                "log values per chunk {} outside [{}, {}]",
                log_values_per_chunk, MIN_LOG_VALUES_PER_CHUNK, MAX_LOG_VALUES_PER_CHUNK
            )));
        }
        if !(1..=4).contains(&offsets_size) {
            return Err(ColumnError::Format(format!(
                "invalid offsets size {offsets_size}"
            )));
        }
        let header = Self {
            byte_order,
            decode_strategy,
            num_chunks,
            num_values,
            log_values_per_chunk,
            offsets_size,
        };
        let expected_chunks = header.expected_chunks();
        if num_chunks as u64 != expected_chunks {
            return Err(ColumnError::Format(format!(
                "chunk count {num_chunks} does not match {num_values} values at {} per chunk",
                header.values_per_chunk()
            )));
        }
        Ok(header)
    }

    #[inline]
    pub fn values_per_chunk(&self) -> usize {
        1usize << self.log_values_per_chunk
    }

    #[inline]
    pub fn chunk_index_mask(&self) -> usize {
        self.values_per_chunk() - 1
    }

    fn expected_chunks(&self) -> u64 {
        let per_chunk = self.values_per_chunk() as u64;
        (self.num_values as u64).div_ceil(per_chunk)
    }

    /// Size in bytes of the `num_chunks + 1` entry offsets table.
    #[inline]
    pub fn offsets_table_len(&self) -> usize {
        (self.num_chunks as usize + 1) * self.offsets_size as usize
    }

    /// Absolute position of the chunk region inside the column bytes.
    #[inline]
    pub fn chunk_region_start(&self) -> usize {
        Self::LEN + self.offsets_table_len()
    }

    /// Number of values held by chunk `chunk`; only the last chunk may be
    /// short.
    #[inline]
    pub fn chunk_value_count(&self, chunk: usize) -> usize {
        let per_chunk = self.values_per_chunk();
        let start = chunk * per_chunk;
        (self.num_values as usize).saturating_sub(start).min(per_chunk)
    }
}

/// Smallest width in bytes (1..=4) able to address `len`.
pub fn offsets_size_for(len: u64) -> Option<u8> {
    match len {
        0..=0xFF => Some(1),
        0x100..=0xFFFF => Some(2),
        0x1_0000..=0xFF_FFFF => Some(3),
        0x100_0000..=0xFFFF_FFFF => Some(4),
        _ => None,
    }
}
