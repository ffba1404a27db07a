use super::IntFormEncoder;
use crate::engine::core::column::format::IntCodec;
use crate::engine::core::column::metrics::{IntFormMetrics, OptimizationTarget};
use crate::engine::errors::ColumnError;

/// Encoder picked for one chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncoderChoice {
    /// Position of the winner in the encoder slice.
    pub index: usize,
    pub codec: IntCodec,
    /// Estimated encoded size in bytes, header included.
    pub size: usize,
    /// Size scaled by the target's weighting; equals `size` for the smaller
    /// size target.
    pub score: f64,
}

/// Evaluates every applicable encoder against the chunk and returns the
/// cheapest under the metrics' optimization target. Equal scores go to the
/// codec with the better priority, then to the earlier encoder.
pub fn select_encoder(
    encoders: &mut [Box<dyn IntFormEncoder>],
    values: &[i32],
    metrics: &IntFormMetrics,
) -> Result<EncoderChoice, ColumnError> {
    let target = metrics.optimization_target();
    let mut best: Option<EncoderChoice> = None;

    for (index, encoder) in encoders.iter_mut().enumerate() {
        encoder.begin_chunk();
        if !encoder.is_applicable(metrics) {
            continue;
        }
        let size = encoder.encoded_size(values, metrics)?;
        let score = match target {
            OptimizationTarget::SmallerSize => size as f64,
            OptimizationTarget::FasterDecode => size as f64 * encoder.speed_modifier(),
        };
        let codec = encoder.codec();
        let better = match &best {
            None => true,
            Some(b) => {
                score < b.score
                    || (score == b.score && codec.priority() < b.codec.priority())
            }
        };
        if better {
            best = Some(EncoderChoice {
                index,
                codec,
                size,
                score,
            });
        }
    }

    best.ok_or_else(|| ColumnError::State("no applicable encoder for chunk".into()))
}
