use crate::engine::core::column::compression::codec_for_algo;
use crate::engine::core::column::encoders::run_length::RUN_FLAG;
use crate::engine::core::column::format::{ByteOrder, DecodeStrategy, IntCodec};
use crate::engine::errors::ColumnError;

/// How a direct (buffer or unsafe) reader addresses the values of one
/// chunk: `bytes_per_value == 0` means every value is `constant`, otherwise
/// value `i` is stored at `base_offset + i * bytes_per_value` within the chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectDescriptor {
    pub bytes_per_value: usize,
    pub base_offset: usize,
    pub constant: i32,
}

/// Same as [`DirectDescriptor`] with the base resolved to a raw pointer into
/// the chunk bytes.
#[derive(Clone, Copy, Debug)]
pub struct UnsafeDescriptor {
    pub bytes_per_value: usize,
    pub base: *const u8,
    pub constant: i32,
}

/// Reader-side half of a chunk codec. `chunk` always starts at the codec
/// header byte and `count` is the number of values the chunk holds.
pub trait IntFormDecoder: Sync {
    fn codec(&self) -> IntCodec;

    /// Materializes all `count` values into `out[..count]`.
    fn transform(
        &self,
        chunk: &[u8],
        count: usize,
        order: ByteOrder,
        out: &mut [i32],
        scratch: &mut Vec<u8>,
    ) -> Result<(), ColumnError>;

    fn transform_buffer(
        &self,
        _chunk: &[u8],
        _count: usize,
        _order: ByteOrder,
    ) -> Result<DirectDescriptor, ColumnError> {
        Err(ColumnError::CapabilityMismatch {
            strategy: DecodeStrategy::Buffer,
            codec: self.codec(),
        })
    }

    fn transform_unsafe(
        &self,
        chunk: &[u8],
        count: usize,
        order: ByteOrder,
    ) -> Result<UnsafeDescriptor, ColumnError> {
        if !self.codec().supports_direct() {
            return Err(ColumnError::CapabilityMismatch {
                strategy: DecodeStrategy::Unsafe,
                codec: self.codec(),
            });
        }
        let d = self.transform_buffer(chunk, count, order)?;
        let base = chunk
            .get(d.base_offset..)
            .ok_or_else(|| ColumnError::Format("direct base offset past chunk end".into()))?
            .as_ptr();
        Ok(UnsafeDescriptor {
            bytes_per_value: d.bytes_per_value,
            base,
            constant: d.constant,
        })
    }
}

fn check_len(codec: IntCodec, chunk: &[u8], expected: usize) -> Result<(), ColumnError> {
    if chunk.len() != expected {
        return Err(ColumnError::Format(format!(
            "{codec} chunk holds {} bytes, expected {expected}",
            chunk.len()
        )));
    }
    Ok(())
}

fn check_out(out: &[i32], count: usize) -> Result<(), ColumnError> {
    if out.len() < count {
        return Err(ColumnError::State(format!(
            "output buffer of {} values cannot hold chunk of {count}",
            out.len()
        )));
    }
    Ok(())
}

/// Decodes values stored at a fixed width right after `base` bytes.
fn unpack_fixed(
    chunk: &[u8],
    base: usize,
    width: usize,
    count: usize,
    order: ByteOrder,
    out: &mut [i32],
) {
    for (slot, bytes) in out[..count]
        .iter_mut()
        .zip(chunk[base..].chunks_exact(width))
    {
        *slot = order.read_value(bytes);
    }
}

pub struct ZeroDecoder;
pub struct ConstantDecoder;
pub struct UnencodedDecoder;
pub struct BytePackDecoder;
pub struct RunLengthDecoder;
pub struct CompressedDecoder;

impl IntFormDecoder for ZeroDecoder {
    fn codec(&self) -> IntCodec {
        IntCodec::Zero
    }

    fn transform(
        &self,
        chunk: &[u8],
        count: usize,
        _order: ByteOrder,
        out: &mut [i32],
        _scratch: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        check_len(IntCodec::Zero, chunk, 1)?;
        check_out(out, count)?;
        out[..count].fill(0);
        Ok(())
    }

    fn transform_buffer(
        &self,
        chunk: &[u8],
        _count: usize,
        _order: ByteOrder,
    ) -> Result<DirectDescriptor, ColumnError> {
        check_len(IntCodec::Zero, chunk, 1)?;
        Ok(DirectDescriptor {
            bytes_per_value: 0,
            base_offset: 0,
            constant: 0,
        })
    }
}

impl IntFormDecoder for ConstantDecoder {
    fn codec(&self) -> IntCodec {
        IntCodec::Constant
    }

    fn transform(
        &self,
        chunk: &[u8],
        count: usize,
        order: ByteOrder,
        out: &mut [i32],
        _scratch: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        let d = self.transform_buffer(chunk, count, order)?;
        check_out(out, count)?;
        out[..count].fill(d.constant);
        Ok(())
    }

    fn transform_buffer(
        &self,
        chunk: &[u8],
        _count: usize,
        order: ByteOrder,
    ) -> Result<DirectDescriptor, ColumnError> {
        check_len(IntCodec::Constant, chunk, 5)?;
        Ok(DirectDescriptor {
            bytes_per_value: 0,
            base_offset: 0,
            constant: order.read_value(&chunk[1..5]),
        })
    }
}

impl IntFormDecoder for UnencodedDecoder {
    fn codec(&self) -> IntCodec {
        IntCodec::Unencoded
    }

    fn transform(
        &self,
        chunk: &[u8],
        count: usize,
        order: ByteOrder,
        out: &mut [i32],
        _scratch: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        let d = self.transform_buffer(chunk, count, order)?;
        check_out(out, count)?;
        unpack_fixed(chunk, d.base_offset, 4, count, order, out);
        Ok(())
    }

    fn transform_buffer(
        &self,
        chunk: &[u8],
        count: usize,
        _order: ByteOrder,
    ) -> Result<DirectDescriptor, ColumnError> {
        check_len(IntCodec::Unencoded, chunk, 1 + 4 * count)?;
        Ok(DirectDescriptor {
            bytes_per_value: 4,
            base_offset: 1,
            constant: 0,
        })
    }
}

impl IntFormDecoder for BytePackDecoder {
    fn codec(&self) -> IntCodec {
        IntCodec::BytePack
    }

    fn transform(
        &self,
        chunk: &[u8],
        count: usize,
        order: ByteOrder,
        out: &mut [i32],
        _scratch: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        let d = self.transform_buffer(chunk, count, order)?;
        check_out(out, count)?;
        unpack_fixed(chunk, d.base_offset, d.bytes_per_value, count, order, out);
        Ok(())
    }

    fn transform_buffer(
        &self,
        chunk: &[u8],
        count: usize,
        _order: ByteOrder,
    ) -> Result<DirectDescriptor, ColumnError> {
        let width = *chunk
            .get(1)
            .ok_or_else(|| ColumnError::Format("bytepack chunk missing width".into()))?
            as usize;
        if !(1..=4).contains(&width) {
            return Err(ColumnError::Format(format!("invalid bytepack width {width}")));
        }
        check_len(IntCodec::BytePack, chunk, 2 + width * count)?;
        Ok(DirectDescriptor {
            bytes_per_value: width,
            base_offset: 2,
            constant: 0,
        })
    }
}

impl IntFormDecoder for RunLengthDecoder {
    fn codec(&self) -> IntCodec {
        IntCodec::RunLength
    }

    fn transform(
        &self,
        chunk: &[u8],
        count: usize,
        order: ByteOrder,
        out: &mut [i32],
        _scratch: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        check_out(out, count)?;
        let truncated = || ColumnError::Format("truncated run-length chunk".into());
        let overflow = || ColumnError::Format("run-length tokens exceed chunk size".into());

        let mut words = chunk.get(1..).ok_or_else(truncated)?.chunks_exact(4);
        if !words.remainder().is_empty() {
            return Err(truncated());
        }
        let mut filled = 0usize;
        while let Some(token) = words.next() {
            let token = order.read_uint(token);
            let len = (token & !RUN_FLAG) as usize;
            let end = filled.checked_add(len).filter(|&e| e <= count).ok_or_else(overflow)?;
            if token & RUN_FLAG != 0 {
                let value = order.read_value(words.next().ok_or_else(truncated)?);
                out[filled..end].fill(value);
            } else {
                for slot in &mut out[filled..end] {
                    *slot = order.read_value(words.next().ok_or_else(truncated)?);
                }
            }
            filled = end;
        }
        if filled != count {
            return Err(ColumnError::Format(format!(
                "run-length chunk decoded {filled} of {count} values"
            )));
        }
        Ok(())
    }
}

/// Upper bound on an inner chunk produced by any compressible encoder.
#[inline]
pub fn max_inner_chunk_len(count: usize) -> usize {
    16 + 8 * count
}

impl IntFormDecoder for CompressedDecoder {
    fn codec(&self) -> IntCodec {
        IntCodec::Compressed
    }

    fn transform(
        &self,
        chunk: &[u8],
        count: usize,
        order: ByteOrder,
        out: &mut [i32],
        scratch: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        let algo = *chunk
            .get(1)
            .ok_or_else(|| ColumnError::Format("compressed chunk missing algorithm".into()))?;
        let codec = codec_for_algo(algo)?;
        scratch.clear();
        codec.decompress_into(&chunk[2..], max_inner_chunk_len(count), scratch)?;

        let inner_id = *scratch
            .first()
            .ok_or_else(|| ColumnError::Format("compressed chunk is empty".into()))?;
        if inner_id == IntCodec::Compressed.id() {
            return Err(ColumnError::Format("nested compressed chunk".into()));
        }
        let inner = decoder_for(inner_id)?;

        let bytes = std::mem::take(scratch);
        let result = inner.transform(&bytes, count, order, out, &mut Vec::new());
        *scratch = bytes;
        result
    }
}

static DECODERS: [&dyn IntFormDecoder; 6] = [
    &ZeroDecoder,
    &ConstantDecoder,
    &UnencodedDecoder,
    &BytePackDecoder,
    &RunLengthDecoder,
    &CompressedDecoder,
];

/// Decoder for a chunk header byte.
#[inline]
pub fn decoder_for(id: u8) -> Result<&'static dyn IntFormDecoder, ColumnError> {
    DECODERS
        .get(id as usize)
        .copied()
        .ok_or_else(|| ColumnError::Format(format!("unknown chunk codec {id:#04x}")))
}
