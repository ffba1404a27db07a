use crate::engine::core::column::column_serializer::{
    ColumnarIntsSerializer, SerializerOptions, SerializerStats,
};
use crate::engine::core::column::compression::CompressionKind;
use crate::engine::core::column::format::{ByteOrder, DecodeStrategy, IntCodec};
use crate::engine::core::column::metrics::OptimizationTarget;

/// Serializes a value sequence into column bytes.
pub struct ColumnFactory {
    values: Vec<i32>,
    options: SerializerOptions,
}

impl ColumnFactory {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            options: SerializerOptions::default(),
        }
    }

    pub fn with_values(mut self, values: Vec<i32>) -> Self {
        self.values = values;
        self
    }

    pub fn with_options(mut self, options: SerializerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_log_values_per_chunk(mut self, log: u8) -> Self {
        self.options.log_values_per_chunk = log;
        self
    }

    pub fn with_compression(mut self, compression: CompressionKind) -> Self {
        self.options.compression = compression;
        self
    }

    pub fn with_target(mut self, target: OptimizationTarget) -> Self {
        self.options.target = target;
        self
    }

    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.options.byte_order = order;
        self
    }

    pub fn with_decode_strategy(mut self, strategy: DecodeStrategy) -> Self {
        self.options.decode_strategy = strategy;
        self
    }

    pub fn with_codecs(mut self, codecs: Vec<IntCodec>) -> Self {
        self.options.codecs = codecs;
        self
    }

    pub fn with_codec(mut self, codec: IntCodec) -> Self {
        self.options = self.options.with_codec(codec);
        self
    }

    pub fn create(self) -> Vec<u8> {
        self.create_with_stats().0
    }

    pub fn create_with_stats(self) -> (Vec<u8>, SerializerStats) {
        let mut serializer =
            ColumnarIntsSerializer::new(self.options).expect("valid serializer options");
        serializer.add_values(&self.values).expect("values accepted");
        let bytes = serializer.to_bytes().expect("column serialized");
        (bytes, serializer.stats().clone())
    }
}

impl Default for ColumnFactory {
    fn default() -> Self {
        Self::new()
    }
}
