use super::IntFormEncoder;
use crate::engine::core::column::format::IntCodec;
use crate::engine::core::column::metrics::IntFormMetrics;
use crate::engine::errors::ColumnError;

/// Chunk made only of zeros.
///
/// layout: | header: ZERO (u8) |
pub struct ZeroIntFormEncoder;

impl IntFormEncoder for ZeroIntFormEncoder {
    fn codec(&self) -> IntCodec {
        IntCodec::Zero
    }

    fn is_applicable(&self, metrics: &IntFormMetrics) -> bool {
        metrics.is_zero()
    }

    fn encoded_size(
        &mut self,
        _values: &[i32],
        _metrics: &IntFormMetrics,
    ) -> Result<usize, ColumnError> {
        Ok(1)
    }

    fn encode(
        &mut self,
        _values: &[i32],
        _metrics: &IntFormMetrics,
        out: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        out.push(IntCodec::Zero.id());
        Ok(())
    }

    fn speed_modifier(&self) -> f64 {
        0.5
    }
}
