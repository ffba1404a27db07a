pub mod compression_codec;
pub mod slice_reader;

pub use compression_codec::{
    CompressionCodec, CompressionKind, Lz4Codec, ZstdCodec, codec_for_algo,
};
pub use slice_reader::{OrderedSliceReader, SIZE_U8, SIZE_U32};
