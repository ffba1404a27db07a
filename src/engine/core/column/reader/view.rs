use std::sync::Arc;

use crate::engine::core::column::format::{ColumnDataHeader, IntCodec};
use crate::engine::errors::ColumnError;

/// Parsed column: header, decoded offsets table and the borrowed chunk
/// region. Cloning is cheap; every reader owns a clone.
#[derive(Clone, Debug)]
pub struct ColumnData<'a> {
    header: ColumnDataHeader,
    offsets: Arc<[u32]>,
    region: &'a [u8],
    codec_mask: u8,
}

impl<'a> ColumnData<'a> {
    /// Validates the header, the offsets table and every chunk's codec byte.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ColumnError> {
        let header = ColumnDataHeader::read_from(bytes)?;
        let table_start = ColumnDataHeader::LEN;
        let region_start = header.chunk_region_start();
        if bytes.len() < region_start {
            return Err(ColumnError::Format(format!(
                "offsets table out of bounds: need {} bytes, have {}",
                region_start,
                bytes.len()
            )));
        }

        let width = header.offsets_size as usize;
        let offsets: Arc<[u32]> = bytes[table_start..region_start]
            .chunks_exact(width)
            .map(|entry| header.byte_order.read_uint(entry))
            .collect();

        if offsets.first().copied() != Some(0) {
            return Err(ColumnError::Format("first chunk offset must be zero".into()));
        }
        if let Some(i) = offsets.windows(2).position(|w| w[1] < w[0]) {
            return Err(ColumnError::Format(format!(
                "offsets decrease at chunk {}: {} < {}",
                i + 1,
                offsets[i + 1],
                offsets[i]
            )));
        }

        let region_len = offsets[offsets.len() - 1] as usize;
        let region = bytes
            .get(region_start..region_start + region_len)
            .ok_or_else(|| {
                ColumnError::Format(format!(
                    "chunk region truncated: need {} bytes, have {}",
                    region_len,
                    bytes.len() - region_start
                ))
            })?;

        let mut view = Self {
            header,
            offsets,
            region,
            codec_mask: 0,
        };
        for chunk in 0..header.num_chunks as usize {
            let first = view.chunk(chunk)?.first().copied().ok_or_else(|| {
                ColumnError::Format(format!("chunk {chunk} has no codec header"))
            })?;
            view.codec_mask |= IntCodec::try_from(first)?.mask();
        }
        Ok(view)
    }

    #[inline]
    pub fn header(&self) -> &ColumnDataHeader {
        &self.header
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.header.num_values as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.header.num_values == 0
    }

    #[inline]
    pub fn num_chunks(&self) -> usize {
        self.header.num_chunks as usize
    }

    /// Bytes of chunk `chunk`, codec header included.
    #[inline]
    pub fn chunk(&self, chunk: usize) -> Result<&'a [u8], ColumnError> {
        if chunk >= self.num_chunks() {
            return Err(ColumnError::Format(format!(
                "chunk {chunk} out of {} chunks",
                self.num_chunks()
            )));
        }
        let start = self.offsets[chunk] as usize;
        let end = self.offsets[chunk + 1] as usize;
        Ok(&self.region[start..end])
    }

    /// Total column length: header, offsets table and chunk region.
    pub fn total_len(&self) -> usize {
        self.header.chunk_region_start() + self.region.len()
    }

    /// Codecs found in chunk headers, in id order.
    pub fn codecs_present(&self) -> Vec<IntCodec> {
        IntCodec::ALL
            .into_iter()
            .filter(|c| self.contains_codec(*c))
            .collect()
    }

    #[inline]
    pub fn contains_codec(&self, codec: IntCodec) -> bool {
        self.codec_mask & codec.mask() != 0
    }
}
