pub mod bytepack;
pub mod compressed;
pub mod constant;
pub mod run_length;
pub mod selector;
pub mod unencoded;
pub mod zero;

use std::sync::Arc;

use crate::engine::core::column::compression::CompressionCodec;
use crate::engine::core::column::format::{ByteOrder, IntCodec};
use crate::engine::core::column::metrics::IntFormMetrics;
use crate::engine::errors::ColumnError;

pub use bytepack::BytePackIntFormEncoder;
pub use compressed::CompressedIntFormEncoder;
pub use constant::ConstantIntFormEncoder;
pub use run_length::RunLengthIntFormEncoder;
pub use selector::{EncoderChoice, select_encoder};
pub use unencoded::UnencodedIntFormEncoder;
pub use zero::ZeroIntFormEncoder;

#[cfg(test)]
mod selector_test;

/// Writer-side half of a chunk codec.
///
/// `encoded_size` and `encode` both include the one byte codec header, so a
/// chosen encoder's cost is exactly the number of bytes its chunk occupies
/// (run-length estimates are an upper bound).
pub trait IntFormEncoder {
    fn codec(&self) -> IntCodec;

    fn is_applicable(&self, metrics: &IntFormMetrics) -> bool;

    fn encoded_size(
        &mut self,
        values: &[i32],
        metrics: &IntFormMetrics,
    ) -> Result<usize, ColumnError>;

    fn encode(
        &mut self,
        values: &[i32],
        metrics: &IntFormMetrics,
        out: &mut Vec<u8>,
    ) -> Result<(), ColumnError>;

    /// Relative decode cost used by the faster-decode target.
    fn speed_modifier(&self) -> f64;

    /// Whether the compressed encoder may wrap this encoder's output.
    fn is_compressible(&self) -> bool {
        false
    }

    /// Called before a new chunk is evaluated; drops any per-chunk state.
    fn begin_chunk(&mut self) {}
}

/// Builds the non-compressed encoder for `codec`.
pub fn base_encoder(codec: IntCodec, order: ByteOrder) -> Option<Box<dyn IntFormEncoder>> {
    match codec {
        IntCodec::Zero => Some(Box::new(ZeroIntFormEncoder)),
        IntCodec::Constant => Some(Box::new(ConstantIntFormEncoder::new(order))),
        IntCodec::Unencoded => Some(Box::new(UnencodedIntFormEncoder::new(order))),
        IntCodec::BytePack => Some(Box::new(BytePackIntFormEncoder::new(order))),
        IntCodec::RunLength => Some(Box::new(RunLengthIntFormEncoder::new(order))),
        IntCodec::Compressed => None,
    }
}

/// Instantiates the encoder set for a column, in codec priority order.
///
/// Zero and Unencoded are always present. When `Compressed` is enabled and a
/// compression codec is supplied, every compressible encoder also gets a
/// compressed twin.
pub fn build_encoders(
    enabled: &[IntCodec],
    order: ByteOrder,
    compression: Option<Arc<dyn CompressionCodec>>,
) -> Vec<Box<dyn IntFormEncoder>> {
    let is_enabled = |c: IntCodec| {
        matches!(c, IntCodec::Zero | IntCodec::Unencoded) || enabled.contains(&c)
    };

    let mut encoders: Vec<Box<dyn IntFormEncoder>> = IntCodec::ALL
        .iter()
        .copied()
        .filter(|&c| is_enabled(c))
        .filter_map(|c| base_encoder(c, order))
        .collect();

    if let (true, Some(codec)) = (is_enabled(IntCodec::Compressed), compression) {
        let wrapped: Vec<IntCodec> = encoders
            .iter()
            .filter(|e| e.is_compressible())
            .map(|e| e.codec())
            .collect();
        for inner in wrapped {
            if let Some(inner) = base_encoder(inner, order) {
                encoders.push(Box::new(CompressedIntFormEncoder::new(
                    inner,
                    Arc::clone(&codec),
                )));
            }
        }
    }
    encoders
}
