use std::collections::BTreeMap;
use std::io::Write;

use tracing::{Level, debug, info};

use crate::engine::core::column::compression::{CompressionKind, compression_codec};
use crate::engine::core::column::encoders::{IntFormEncoder, build_encoders, select_encoder};
use crate::engine::core::column::format::{
    ByteOrder, ColumnDataHeader, DEFAULT_LOG_VALUES_PER_CHUNK, DecodeStrategy, IntCodec,
    MAX_LOG_VALUES_PER_CHUNK, MIN_LOG_VALUES_PER_CHUNK, offsets_size_for,
};
use crate::engine::core::column::metrics::{IntFormMetrics, OptimizationTarget};
use crate::engine::errors::ColumnError;
use crate::shared::config::model::CodecConfig;

/// Codecs tried when nothing else is configured. Compressed only takes part
/// when a compression strategy is set.
pub const DEFAULT_CODECS: [IntCodec; 5] = [
    IntCodec::Zero,
    IntCodec::Constant,
    IntCodec::Unencoded,
    IntCodec::RunLength,
    IntCodec::Compressed,
];

#[derive(Clone, Debug, PartialEq)]
pub struct SerializerOptions {
    pub log_values_per_chunk: u8,
    pub target: OptimizationTarget,
    pub compression: CompressionKind,
    pub compression_level: i32,
    pub byte_order: ByteOrder,
    pub decode_strategy: DecodeStrategy,
    pub max_values: u32,
    pub codecs: Vec<IntCodec>,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            log_values_per_chunk: DEFAULT_LOG_VALUES_PER_CHUNK,
            target: OptimizationTarget::default(),
            compression: CompressionKind::default(),
            compression_level: compression_codec::DEFAULT_ZSTD_LEVEL,
            byte_order: ByteOrder::default(),
            decode_strategy: DecodeStrategy::default(),
            max_values: u32::MAX,
            codecs: DEFAULT_CODECS.to_vec(),
        }
    }
}

impl SerializerOptions {
    /// Resolves the string-typed configuration into options. Unknown names
    /// are rejected rather than defaulted.
    pub fn from_config(cfg: &CodecConfig) -> Result<Self, ColumnError> {
        let codecs = if cfg.codecs.is_empty() {
            DEFAULT_CODECS.to_vec()
        } else {
            cfg.codecs
                .iter()
                .map(|name| name.parse::<IntCodec>())
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(Self {
            log_values_per_chunk: cfg.log_values_per_chunk,
            target: cfg.optimization_target.parse()?,
            compression: cfg.compression.parse()?,
            compression_level: cfg.compression_level,
            byte_order: cfg.byte_order.parse()?,
            decode_strategy: cfg.decode_strategy.parse()?,
            max_values: cfg.max_values,
            codecs,
        })
    }

    pub fn with_log_values_per_chunk(mut self, log: u8) -> Self {
        self.log_values_per_chunk = log;
        self
    }

    pub fn with_target(mut self, target: OptimizationTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_compression(mut self, compression: CompressionKind) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    pub fn with_decode_strategy(mut self, strategy: DecodeStrategy) -> Self {
        self.decode_strategy = strategy;
        self
    }

    pub fn with_max_values(mut self, max_values: u32) -> Self {
        self.max_values = max_values;
        self
    }

    pub fn with_codec(mut self, codec: IntCodec) -> Self {
        if !self.codecs.contains(&codec) {
            self.codecs.push(codec);
        }
        self
    }
}

/// Chunks and bytes written per codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CodecUsage {
    pub chunks: usize,
    pub bytes: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SerializerStats {
    usage: BTreeMap<IntCodec, CodecUsage>,
}

impl SerializerStats {
    fn record(&mut self, codec: IntCodec, bytes: usize) {
        let entry = self.usage.entry(codec).or_default();
        entry.chunks += 1;
        entry.bytes += bytes;
    }

    pub fn usage(&self, codec: IntCodec) -> CodecUsage {
        self.usage.get(&codec).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IntCodec, CodecUsage)> + '_ {
        self.usage.iter().map(|(c, u)| (*c, *u))
    }

    pub fn total_chunks(&self) -> usize {
        self.usage.values().map(|u| u.chunks).sum()
    }
}

/// Write-once builder for an integer column.
///
/// Values are buffered one chunk at a time; when the chunk is full the
/// encoder set is evaluated against it and the winner appends the chunk to
/// the region. `close` finishes the partial tail chunk and fixes the header.
pub struct ColumnarIntsSerializer {
    options: SerializerOptions,
    encoders: Vec<Box<dyn IntFormEncoder>>,
    metrics: IntFormMetrics,
    pending: Vec<i32>,
    chunk_starts: Vec<usize>,
    region: Vec<u8>,
    num_values: u32,
    direct_capable: bool,
    stats: SerializerStats,
    header: Option<ColumnDataHeader>,
    failed: bool,
}

impl ColumnarIntsSerializer {
    pub fn new(options: SerializerOptions) -> Result<Self, ColumnError> {
        let compression = options.compression.codec(options.compression_level);
        let encoders = build_encoders(&options.codecs, options.byte_order, compression);
        Self::with_encoders(options, encoders)
    }

    /// Serializer over a caller-supplied encoder set. `options.codecs` and
    /// `options.compression` are not consulted.
    pub fn with_encoders(
        options: SerializerOptions,
        encoders: Vec<Box<dyn IntFormEncoder>>,
    ) -> Result<Self, ColumnError> {
        if !(MIN_LOG_VALUES_PER_CHUNK..=MAX_LOG_VALUES_PER_CHUNK)
            .contains(&options.log_values_per_chunk)
        {
            return Err(ColumnError::State(format!(
                "log values per chunk {} outside [{}, {}]",
                options.log_values_per_chunk, MIN_LOG_VALUES_PER_CHUNK, MAX_LOG_VALUES_PER_CHUNK
            )));
        }
        let per_chunk = 1usize << options.log_values_per_chunk;

        if tracing::enabled!(Level::DEBUG) {
            let names: Vec<String> = encoders.iter().map(|e| e.codec().to_string()).collect();
            debug!(
                target: "codec::serializer::init",
                per_chunk,
                target_policy = %options.target,
                compression = %options.compression,
                encoders = ?names,
                "Created column serializer"
            );
        }

        Ok(Self {
            metrics: IntFormMetrics::new(options.target),
            encoders,
            pending: Vec::with_capacity(per_chunk),
            chunk_starts: Vec::new(),
            region: Vec::new(),
            num_values: 0,
            direct_capable: true,
            stats: SerializerStats::default(),
            header: None,
            failed: false,
            options,
        })
    }

    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    pub fn add_value(&mut self, value: i32) -> Result<(), ColumnError> {
        self.ensure_usable()?;
        if self.header.is_some() {
            return Err(ColumnError::State(
                "cannot add values after the column was closed".into(),
            ));
        }
        if self.num_values >= self.options.max_values {
            return Err(ColumnError::State(format!(
                "column exceeds the maximum of {} values",
                self.options.max_values
            )));
        }
        self.metrics.process_next_row(value);
        self.pending.push(value);
        self.num_values += 1;
        if self.pending.len() == 1usize << self.options.log_values_per_chunk {
            self.flush_chunk()?;
        }
        Ok(())
    }

    pub fn add_values(&mut self, values: &[i32]) -> Result<(), ColumnError> {
        values.iter().try_for_each(|&v| self.add_value(v))
    }

    fn ensure_usable(&self) -> Result<(), ColumnError> {
        if self.failed {
            return Err(ColumnError::State(
                "serializer is unusable after a failed chunk encode".into(),
            ));
        }
        Ok(())
    }

    /// Any encode failure poisons the serializer.
    fn flush_chunk(&mut self) -> Result<(), ColumnError> {
        let result = self.encode_pending();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn encode_pending(&mut self) -> Result<(), ColumnError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let choice = select_encoder(&mut self.encoders, &self.pending, &self.metrics)?;
        let start = self.region.len();
        self.chunk_starts.push(start);
        self.encoders[choice.index].encode(&self.pending, &self.metrics, &mut self.region)?;
        let written = self.region.len() - start;

        if !choice.codec.supports_direct() {
            self.direct_capable = false;
        }
        self.stats.record(choice.codec, written);

        if tracing::enabled!(Level::DEBUG) {
            debug!(
                target: "codec::serializer::chunk",
                chunk = self.chunk_starts.len() - 1,
                values = self.pending.len(),
                codec = %choice.codec,
                bytes = written,
                estimate = choice.size,
                "Encoded chunk"
            );
        }

        self.pending.clear();
        self.metrics.reset();
        Ok(())
    }

    /// Encodes the tail chunk and freezes the layout. Calling it again is a
    /// no-op.
    pub fn close(&mut self) -> Result<(), ColumnError> {
        self.ensure_usable()?;
        if self.header.is_some() {
            return Ok(());
        }
        self.flush_chunk()?;

        let region_len = self.region.len();
        let offsets_size = offsets_size_for(region_len as u64).ok_or_else(|| {
            ColumnError::State(format!("chunk region of {region_len} bytes is too large"))
        })?;
        let decode_strategy = if self.direct_capable {
            self.options.decode_strategy
        } else {
            DecodeStrategy::Block
        };
        let header = ColumnDataHeader::new(
            self.options.byte_order,
            decode_strategy,
            self.chunk_starts.len() as u32,
            self.num_values,
            self.options.log_values_per_chunk,
            offsets_size,
        );
        self.header = Some(header);

        if tracing::enabled!(Level::INFO) {
            info!(
                target: "codec::serializer::close",
                values = self.num_values,
                chunks = header.num_chunks,
                region_bytes = region_len,
                offsets_size,
                decode_strategy = %decode_strategy,
                "Closed integer column"
            );
        }
        Ok(())
    }

    fn closed_header(&mut self) -> Result<ColumnDataHeader, ColumnError> {
        self.close()?;
        self.header
            .ok_or_else(|| ColumnError::State("column header missing after close".into()))
    }

    pub fn serialized_size(&mut self) -> Result<usize, ColumnError> {
        let header = self.closed_header()?;
        Ok(header.chunk_region_start() + self.region.len())
    }

    /// Writes header, offsets table and chunk region to `writer`.
    pub fn write_to<W: Write>(&mut self, writer: &mut W) -> Result<(), ColumnError> {
        let header = self.closed_header()?;
        let order = header.byte_order;
        let width = header.offsets_size as usize;

        let mut head = Vec::with_capacity(header.chunk_region_start());
        header.write_to(&mut head);
        for &start in self.chunk_starts.iter().chain(std::iter::once(&self.region.len())) {
            order.put_uint(start as u32, width, &mut head);
        }
        writer.write_all(&head)?;
        writer.write_all(&self.region)?;
        Ok(())
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>, ColumnError> {
        let mut out = Vec::with_capacity(self.serialized_size()?);
        self.write_to(&mut out)?;
        Ok(out)
    }

    pub fn num_values(&self) -> u32 {
        self.num_values
    }

    pub fn stats(&self) -> &SerializerStats {
        &self.stats
    }
}
