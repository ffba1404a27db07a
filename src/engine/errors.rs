use std::io;
use thiserror::Error;
use tracing::{debug, error};

use crate::engine::core::column::format::{DecodeStrategy, IntCodec};

/// Errors raised while encoding or decoding an integer column.
#[derive(Debug, Error)]
pub enum ColumnError {
    #[error("Column format error: {0}")]
    Format(String),

    #[error("Serializer state error: {0}")]
    State(String),

    #[error("Decode strategy {strategy} is not supported by codec {codec} present in the column")]
    CapabilityMismatch {
        strategy: DecodeStrategy,
        codec: IntCodec,
    },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Index {index} out of range for column of {len} values")]
    OutOfRange { index: usize, len: usize },

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ColumnError {
    pub fn log_error(&self) {
        match self {
            ColumnError::Format(e) => {
                error!("Column format error: {}", e);
                debug!("Column format error details: {}", e);
            }
            ColumnError::State(e) => {
                error!("Serializer state error: {}", e);
                debug!("Serializer state error details: {}", e);
            }
            ColumnError::CapabilityMismatch { strategy, codec } => {
                error!("Decode strategy {} unsupported by codec {}", strategy, codec);
                debug!(
                    "Capability mismatch details: strategy={:?} codec={:?}",
                    strategy, codec
                );
            }
            ColumnError::Unsupported(e) => {
                error!("Unsupported operation: {}", e);
                debug!("Unsupported operation details: {}", e);
            }
            ColumnError::OutOfRange { index, len } => {
                error!("Index {} out of range", index);
                debug!("Out of range details: index={} len={}", index, len);
            }
            ColumnError::Compression(e) => {
                error!("Compression error: {}", e);
                debug!("Compression error details: {}", e);
            }
            ColumnError::Io(e) => {
                error!("I/O error: {}", e);
                debug!("I/O error details: {:?}", e);
            }
        }
    }
}
