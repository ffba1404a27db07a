use super::IntFormEncoder;
use crate::engine::core::column::format::{ByteOrder, IntCodec};
use crate::engine::core::column::metrics::IntFormMetrics;
use crate::engine::errors::ColumnError;

/// Non-negative values packed into the fewest whole bytes that hold the chunk
/// maximum.
///
/// layout: | header: BYTEPACK (u8) | width (u8) | values (count * width) |
pub struct BytePackIntFormEncoder {
    order: ByteOrder,
}

impl BytePackIntFormEncoder {
    pub fn new(order: ByteOrder) -> Self {
        Self { order }
    }
}

/// Bytes needed per value, or `None` when packing gains nothing over four
/// byte values.
pub fn byte_width_for(metrics: &IntFormMetrics) -> Option<usize> {
    if metrics.num_values() == 0 || metrics.min_value() < 0 {
        return None;
    }
    match metrics.max_value() {
        0..=0xFF => Some(1),
        0x100..=0xFFFF => Some(2),
        0x1_0000..=0xFF_FFFF => Some(3),
        _ => None,
    }
}

impl IntFormEncoder for BytePackIntFormEncoder {
    fn codec(&self) -> IntCodec {
        IntCodec::BytePack
    }

    fn is_applicable(&self, metrics: &IntFormMetrics) -> bool {
        byte_width_for(metrics).is_some()
    }

    fn encoded_size(
        &mut self,
        values: &[i32],
        metrics: &IntFormMetrics,
    ) -> Result<usize, ColumnError> {
        let width = byte_width_for(metrics)
            .ok_or_else(|| ColumnError::State("bytepack is not applicable to chunk".into()))?;
        Ok(2 + width * values.len())
    }

    fn encode(
        &mut self,
        values: &[i32],
        metrics: &IntFormMetrics,
        out: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        let width = byte_width_for(metrics)
            .ok_or_else(|| ColumnError::State("bytepack is not applicable to chunk".into()))?;
        out.reserve(2 + width * values.len());
        out.push(IntCodec::BytePack.id());
        out.push(width as u8);
        for &v in values {
            self.order.put_uint(v as u32, width, out);
        }
        Ok(())
    }

    fn speed_modifier(&self) -> f64 {
        1.1
    }

    fn is_compressible(&self) -> bool {
        true
    }
}
