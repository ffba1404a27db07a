use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;

use crate::engine::errors::ColumnError;

use lz4_flex::block::{
    compress_prepend_size as lz4_compress, decompress_into as lz4_decompress_into,
};

pub const ALGO_LZ4: u8 = 0x01;
pub const ALGO_ZSTD: u8 = 0x02;

pub const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Byte compression strategy wrapped around a compressible chunk encoding.
pub trait CompressionCodec: Sync {
    fn algo_id(&self) -> u8;
    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, ColumnError>;
    /// Decompresses into `out`, replacing its contents. `max_len` bounds the
    /// decompressed size; larger output is treated as corruption.
    fn decompress_into(
        &self,
        input: &[u8],
        max_len: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), ColumnError>;
}

pub struct Lz4Codec;

impl CompressionCodec for Lz4Codec {
    fn algo_id(&self) -> u8 {
        ALGO_LZ4
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, ColumnError> {
        Ok(lz4_compress(input))
    }

    fn decompress_into(
        &self,
        input: &[u8],
        max_len: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        // Blocks are size-prepended by lz4_compress
        if input.len() < 4 {
            return Err(ColumnError::Compression(
                "lz4 block too short to contain size header".into(),
            ));
        }
        let mut sz = [0u8; 4];
        sz.copy_from_slice(&input[..4]);
        let out_len = u32::from_le_bytes(sz) as usize;
        if out_len > max_len {
            return Err(ColumnError::Compression(format!(
                "lz4 block declares {out_len} bytes, limit is {max_len}"
            )));
        }
        out.clear();
        out.resize(out_len, 0);
        let written = lz4_decompress_into(&input[4..], &mut out[..])
            .map_err(|e| ColumnError::Compression(format!("lz4 decompress: {e}")))?;
        if written != out_len {
            return Err(ColumnError::Compression(format!(
                "lz4 decompressed {written} bytes, expected {out_len}"
            )));
        }
        Ok(())
    }
}

pub struct ZstdCodec {
    level: i32,
}

impl ZstdCodec {
    pub const fn new(level: i32) -> Self {
        Self { level }
    }
}

impl CompressionCodec for ZstdCodec {
    fn algo_id(&self) -> u8 {
        ALGO_ZSTD
    }

    fn compress(&self, input: &[u8]) -> Result<Vec<u8>, ColumnError> {
        zstd::encode_all(input, self.level)
            .map_err(|e| ColumnError::Compression(format!("zstd compress: {e}")))
    }

    fn decompress_into(
        &self,
        input: &[u8],
        max_len: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        out.clear();
        let decoder = zstd::stream::read::Decoder::new(input)
            .map_err(|e| ColumnError::Compression(format!("zstd decompress: {e}")))?;
        // One byte past the limit is enough to detect an oversized frame
        decoder
            .take(max_len as u64 + 1)
            .read_to_end(out)
            .map_err(|e| ColumnError::Compression(format!("zstd decompress: {e}")))?;
        if out.len() > max_len {
            out.clear();
            return Err(ColumnError::Compression(format!(
                "zstd frame exceeds limit of {max_len} bytes"
            )));
        }
        Ok(())
    }
}

static LZ4_CODEC: Lz4Codec = Lz4Codec;
static ZSTD_CODEC: ZstdCodec = ZstdCodec::new(DEFAULT_ZSTD_LEVEL);

/// Decompressor for the algorithm id stored in a compressed chunk.
pub fn codec_for_algo(id: u8) -> Result<&'static dyn CompressionCodec, ColumnError> {
    match id {
        ALGO_LZ4 => Ok(&LZ4_CODEC),
        ALGO_ZSTD => Ok(&ZSTD_CODEC),
        other => Err(ColumnError::Format(format!(
            "unknown compression algorithm {other:#04x}"
        ))),
    }
}

/// Compression strategy requested by the column writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CompressionKind {
    None,
    #[default]
    Lz4,
    Zstd,
}

impl CompressionKind {
    /// Builds the writer-side codec; `None` disables the compressed encoder.
    pub fn codec(self, level: i32) -> Option<Arc<dyn CompressionCodec>> {
        match self {
            CompressionKind::None => None,
            CompressionKind::Lz4 => Some(Arc::new(Lz4Codec)),
            CompressionKind::Zstd => Some(Arc::new(ZstdCodec::new(level))),
        }
    }
}

impl FromStr for CompressionKind {
    type Err = ColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "uncompressed" => Ok(CompressionKind::None),
            "lz4" => Ok(CompressionKind::Lz4),
            "zstd" => Ok(CompressionKind::Zstd),
            other => Err(ColumnError::State(format!(
                "compression strategy unavailable: '{other}'"
            ))),
        }
    }
}

impl fmt::Display for CompressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionKind::None => f.write_str("none"),
            CompressionKind::Lz4 => f.write_str("lz4"),
            CompressionKind::Zstd => f.write_str("zstd"),
        }
    }
}
