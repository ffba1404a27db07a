use super::IntFormEncoder;
use crate::engine::core::column::format::{ByteOrder, IntCodec};
use crate::engine::core::column::metrics::IntFormMetrics;
use crate::engine::errors::ColumnError;

/// Set on a token word when it introduces a run rather than literals.
pub const RUN_FLAG: u32 = 0x8000_0000;
pub const MIN_RUN_LENGTH: usize = 3;

/// Repeated values collapsed into run tokens, everything else stored as
/// literal groups.
///
/// layout: | header: RUNLENGTH (u8) | tokens |
/// run token: | RUN_FLAG | length (u32) | value (i32) |
/// literal token: | count (u32) | values (count * i32) |
pub struct RunLengthIntFormEncoder {
    order: ByteOrder,
}

impl RunLengthIntFormEncoder {
    pub fn new(order: ByteOrder) -> Self {
        Self { order }
    }

    fn flush_literals(&self, literals: &[i32], out: &mut Vec<u8>) {
        if literals.is_empty() {
            return;
        }
        self.order.put_u32(literals.len() as u32, out);
        for &v in literals {
            self.order.put_i32(v, out);
        }
    }
}

impl IntFormEncoder for RunLengthIntFormEncoder {
    fn codec(&self) -> IntCodec {
        IntCodec::RunLength
    }

    fn is_applicable(&self, metrics: &IntFormMetrics) -> bool {
        metrics.num_distinct_runs() > 0
    }

    fn encoded_size(
        &mut self,
        _values: &[i32],
        metrics: &IntFormMetrics,
    ) -> Result<usize, ColumnError> {
        let runs = metrics.num_distinct_runs();
        let literals = metrics.num_values() - metrics.num_run_values();
        let literal_groups = (runs + 1).min(literals);
        Ok(1 + 8 * runs + 4 * literals + 4 * literal_groups)
    }

    fn encode(
        &mut self,
        values: &[i32],
        _metrics: &IntFormMetrics,
        out: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        out.push(IntCodec::RunLength.id());

        let mut literal_start = 0;
        let mut i = 0;
        while i < values.len() {
            let value = values[i];
            let mut j = i + 1;
            while j < values.len() && values[j] == value {
                j += 1;
            }
            let run = j - i;
            if run >= MIN_RUN_LENGTH {
                self.flush_literals(&values[literal_start..i], out);
                self.order.put_u32(RUN_FLAG | run as u32, out);
                self.order.put_i32(value, out);
                literal_start = j;
            }
            i = j;
        }
        self.flush_literals(&values[literal_start..], out);
        Ok(())
    }

    fn speed_modifier(&self) -> f64 {
        1.4
    }

    fn is_compressible(&self) -> bool {
        true
    }
}
