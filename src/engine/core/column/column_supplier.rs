use std::io::Write;

use tracing::{Level, debug, warn};

use crate::engine::core::column::format::{ColumnDataHeader, DecodeStrategy, IntCodec};
use crate::engine::core::column::reader::{
    BlockColumnarInts, ColumnData, ColumnarInts, DirectColumnarInts, DirectMode,
};
use crate::engine::errors::ColumnError;

/// Read-side entry point for a serialized column. Opening validates the
/// layout once; `get` then hands out independent readers that borrow the
/// same bytes.
#[derive(Clone, Debug)]
pub struct ColumnarIntsSupplier<'a> {
    data: ColumnData<'a>,
    strategy: DecodeStrategy,
}

impl<'a> ColumnarIntsSupplier<'a> {
    /// Opens a column. `override_strategy` replaces the persisted decode
    /// strategy; asking for a direct mode on a column holding a block-only
    /// codec is rejected.
    pub fn from_bytes(
        bytes: &'a [u8],
        override_strategy: Option<DecodeStrategy>,
    ) -> Result<Self, ColumnError> {
        let data = ColumnData::parse(bytes)?;
        let persisted = data.header().decode_strategy;
        let block_only = data
            .codecs_present()
            .into_iter()
            .find(|c| !c.supports_direct());

        let strategy = match (override_strategy, block_only) {
            (Some(strategy), Some(codec)) if strategy.is_direct() => {
                return Err(ColumnError::CapabilityMismatch { strategy, codec });
            }
            (Some(strategy), _) => strategy,
            (None, Some(codec)) if persisted.is_direct() => {
                warn!(
                    target: "codec::supplier::open",
                    persisted = %persisted,
                    codec = %codec,
                    "Persisted decode strategy unsupported by column codecs, using block"
                );
                DecodeStrategy::Block
            }
            (None, _) => persisted,
        };

        if tracing::enabled!(Level::DEBUG) {
            debug!(
                target: "codec::supplier::open",
                values = data.len(),
                chunks = data.num_chunks(),
                persisted = %persisted,
                effective = %strategy,
                codecs = ?data.codecs_present(),
                "Opened integer column"
            );
        }
        Ok(Self { data, strategy })
    }

    /// New reader over the column in the effective decode strategy.
    pub fn get(&self) -> Box<dyn ColumnarInts + 'a> {
        match DirectMode::from_strategy(self.strategy) {
            Some(mode) => Box::new(DirectColumnarInts::new(self.data.clone(), mode)),
            None => Box::new(BlockColumnarInts::new(self.data.clone())),
        }
    }

    pub fn serialized_size(&self) -> usize {
        self.data.total_len()
    }

    pub fn write_to<W: Write>(&self, _writer: &mut W) -> Result<(), ColumnError> {
        Err(ColumnError::Unsupported(
            "opened columns are read-only and cannot be serialized".into(),
        ))
    }

    pub fn header(&self) -> &ColumnDataHeader {
        self.data.header()
    }

    /// Effective strategy used by `get`.
    pub fn decode_strategy(&self) -> DecodeStrategy {
        self.strategy
    }

    pub fn codecs_present(&self) -> Vec<IntCodec> {
        self.data.codecs_present()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
