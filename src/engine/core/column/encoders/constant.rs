use super::IntFormEncoder;
use crate::engine::core::column::format::{ByteOrder, IntCodec};
use crate::engine::core::column::metrics::IntFormMetrics;
use crate::engine::errors::ColumnError;

/// Chunk where every value is the same non-zero constant.
///
/// layout: | header: CONSTANT (u8) | value (i32) |
pub struct ConstantIntFormEncoder {
    order: ByteOrder,
}

impl ConstantIntFormEncoder {
    pub fn new(order: ByteOrder) -> Self {
        Self { order }
    }
}

impl IntFormEncoder for ConstantIntFormEncoder {
    fn codec(&self) -> IntCodec {
        IntCodec::Constant
    }

    fn is_applicable(&self, metrics: &IntFormMetrics) -> bool {
        metrics.is_constant()
    }

    fn encoded_size(
        &mut self,
        _values: &[i32],
        _metrics: &IntFormMetrics,
    ) -> Result<usize, ColumnError> {
        Ok(1 + 4)
    }

    fn encode(
        &mut self,
        _values: &[i32],
        metrics: &IntFormMetrics,
        out: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        out.push(IntCodec::Constant.id());
        self.order.put_i32(metrics.min_value(), out);
        Ok(())
    }

    fn speed_modifier(&self) -> f64 {
        0.6
    }
}
