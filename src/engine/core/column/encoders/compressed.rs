use std::sync::Arc;

use super::IntFormEncoder;
use crate::engine::core::column::compression::CompressionCodec;
use crate::engine::core::column::format::IntCodec;
use crate::engine::core::column::metrics::IntFormMetrics;
use crate::engine::errors::ColumnError;

/// Wraps a compressible encoder: the inner encoder writes its complete chunk
/// (header included) to a scratch buffer which is then compressed.
///
/// layout: | header: COMPRESSED (u8) | algorithm id (u8) | compressed inner chunk |
pub struct CompressedIntFormEncoder {
    inner: Box<dyn IntFormEncoder>,
    codec: Arc<dyn CompressionCodec>,
    scratch: Vec<u8>,
    compressed: Option<Vec<u8>>,
}

impl CompressedIntFormEncoder {
    pub fn new(inner: Box<dyn IntFormEncoder>, codec: Arc<dyn CompressionCodec>) -> Self {
        Self {
            inner,
            codec,
            scratch: Vec::new(),
            compressed: None,
        }
    }

    pub fn inner_codec(&self) -> IntCodec {
        self.inner.codec()
    }

    fn compress_chunk(
        &mut self,
        values: &[i32],
        metrics: &IntFormMetrics,
    ) -> Result<&[u8], ColumnError> {
        if self.compressed.is_none() {
            self.scratch.clear();
            self.inner.encode(values, metrics, &mut self.scratch)?;
            self.compressed = Some(self.codec.compress(&self.scratch)?);
        }
        Ok(self.compressed.as_deref().unwrap_or_default())
    }
}

impl IntFormEncoder for CompressedIntFormEncoder {
    fn codec(&self) -> IntCodec {
        IntCodec::Compressed
    }

    fn is_applicable(&self, metrics: &IntFormMetrics) -> bool {
        self.inner.is_applicable(metrics)
    }

    fn encoded_size(
        &mut self,
        values: &[i32],
        metrics: &IntFormMetrics,
    ) -> Result<usize, ColumnError> {
        Ok(2 + self.compress_chunk(values, metrics)?.len())
    }

    fn encode(
        &mut self,
        values: &[i32],
        metrics: &IntFormMetrics,
        out: &mut Vec<u8>,
    ) -> Result<(), ColumnError> {
        let algo = self.codec.algo_id();
        let compressed = self.compress_chunk(values, metrics)?;
        out.reserve(2 + compressed.len());
        out.push(IntCodec::Compressed.id());
        out.push(algo);
        out.extend_from_slice(compressed);
        Ok(())
    }

    fn speed_modifier(&self) -> f64 {
        2.0
    }

    fn begin_chunk(&mut self) {
        self.compressed = None;
        self.inner.begin_chunk();
    }
}
