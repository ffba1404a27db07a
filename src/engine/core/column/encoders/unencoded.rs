use super::IntFormEncoder;
use crate::engine::core::column::format::{ByteOrder, IntCodec};
use crate::engine::core::column::metrics::IntFormMetrics;
use crate::engine::errors::ColumnError;

/// Full width values, the fallback that is applicable to any chunk.
///
/// layout: | header: UNENCODED (u8) | values (count * i32) |
pub struct UnencodedIntFormEncoder {
    order: ByteOrder,
}

impl UnencodedIntFormEncoder {
    pub fn new(order: ByteOrder) -> Self {
        Self { order }
    }
}

impl IntFormEncoder for UnencodedIntFormEncoder {
    fn codec(&self) -> IntCodec {
        IntCodec::Unencoded
    }

    fn is_applicable(&self, _metrics: &IntFormMetrics) -> bool {
        true
    }

    fn encoded_size(
        &mut self,
        values: &[i32],
        _metrics: &IntFormMetrics,
    ) -> Result<usize, ColumnError> {
        Ok(1 + 4 * values.len())
    }

    fn encode(
        &mut self,
        values: &[i32],
        _metrics: &IntFormMetrics,
        out: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        out.reserve(1 + 4 * values.len());
        out.push(IntCodec::Unencoded.id());
        for &v in values {
            self.order.put_i32(v, out);
        }
        Ok(())
    }

    fn speed_modifier(&self) -> f64 {
        1.0
    }

    fn is_compressible(&self) -> bool {
        true
    }
}
