use std::thread;

use crate::engine::core::column::column_supplier::ColumnarIntsSupplier;
use crate::engine::core::column::compression::CompressionKind;
use crate::engine::core::column::format::{
    ByteOrder, ColumnDataHeader, DecodeStrategy, IntCodec, MAX_LOG_VALUES_PER_CHUNK,
    MIN_LOG_VALUES_PER_CHUNK,
};
use crate::engine::core::column::metrics::OptimizationTarget;
use crate::engine::core::column::reader::ColumnarInts;
use crate::engine::errors::ColumnError;
use crate::test_helpers::factories::{ColumnFactory, ValuesFactory};

const DIRECT_CODECS: [IntCodec; 4] = [
    IntCodec::Zero,
    IntCodec::Constant,
    IntCodec::Unencoded,
    IntCodec::BytePack,
];

fn read_all(reader: &mut dyn ColumnarInts) -> Vec<i32> {
    let mut out = vec![0; reader.len()];
    let len = reader.len();
    reader.get_range(&mut out, 0, len).unwrap();
    out
}

fn read_each(reader: &mut dyn ColumnarInts) -> Vec<i32> {
    (0..reader.len()).map(|i| reader.get(i).unwrap()).collect()
}

fn sequences() -> Vec<Vec<i32>> {
    vec![
        Vec::new(),
        vec![42],
        vec![9; 3000],
        vec![0; 3000],
        ValuesFactory::new().with_len(3000).create(),
        ValuesFactory::new().random(0, 300).with_len(3000).create(),
        ValuesFactory::new().ascending(-1500).with_len(3000).create(),
        ValuesFactory::new().runs(12, 50).with_len(3000).create(),
    ]
}

const BYTE_ORDERS: [ByteOrder; 2] = [ByteOrder::Little, ByteOrder::Big];

fn gather_every_third(reader: &mut dyn ColumnarInts) -> Vec<i32> {
    let indices: Vec<usize> = (0..reader.len()).step_by(3).collect();
    let mut out = vec![0; indices.len()];
    reader.get_gather(&mut out, &indices).unwrap();
    out
}

#[test]
fn round_trips_under_every_option_mix() {
    crate::logging::init_for_tests();
    for values in sequences() {
        let every_third: Vec<i32> = values.iter().step_by(3).copied().collect();
        for log in MIN_LOG_VALUES_PER_CHUNK..=MAX_LOG_VALUES_PER_CHUNK {
            for order in BYTE_ORDERS {
                for target in [OptimizationTarget::SmallerSize, OptimizationTarget::FasterDecode] {
                    for compression in
                        [CompressionKind::None, CompressionKind::Lz4, CompressionKind::Zstd]
                    {
                        let bytes = ColumnFactory::new()
                            .with_values(values.clone())
                            .with_log_values_per_chunk(log)
                            .with_byte_order(order)
                            .with_target(target)
                            .with_compression(compression)
                            .with_codec(IntCodec::BytePack)
                            .create();
                        let supplier = ColumnarIntsSupplier::from_bytes(&bytes, None).unwrap();
                        assert_eq!(supplier.len(), values.len());
                        assert_eq!(supplier.serialized_size(), bytes.len());
                        assert_eq!(supplier.header().byte_order, order);

                        let context = format!("log {log} {order} {target} {compression}");
                        let mut reader = supplier.get();
                        assert_eq!(read_each(reader.as_mut()), values, "{context}");
                        assert_eq!(read_all(supplier.get().as_mut()), values, "{context}");
                        assert_eq!(
                            gather_every_third(supplier.get().as_mut()),
                            every_third,
                            "{context}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn strategies_agree_on_direct_capable_columns() {
    for values in sequences() {
        let every_third: Vec<i32> = values.iter().step_by(3).copied().collect();
        for log in MIN_LOG_VALUES_PER_CHUNK..=MAX_LOG_VALUES_PER_CHUNK {
            for order in BYTE_ORDERS {
                let bytes = ColumnFactory::new()
                    .with_values(values.clone())
                    .with_log_values_per_chunk(log)
                    .with_byte_order(order)
                    .with_compression(CompressionKind::None)
                    .with_codecs(DIRECT_CODECS.to_vec())
                    .create();

                for strategy in
                    [DecodeStrategy::Block, DecodeStrategy::Buffer, DecodeStrategy::Unsafe]
                {
                    let supplier =
                        ColumnarIntsSupplier::from_bytes(&bytes, Some(strategy)).unwrap();
                    assert_eq!(supplier.decode_strategy(), strategy);

                    let context = format!("log {log} {order} {strategy}");
                    let mut reader = supplier.get();
                    assert_eq!(read_each(reader.as_mut()), values, "{context}");
                    assert_eq!(read_all(reader.as_mut()), values, "{context}");
                    assert_eq!(gather_every_third(reader.as_mut()), every_third, "{context}");
                }
            }
        }
    }
}

#[test]
fn big_endian_bytepack_widths_read_back_directly() {
    for (low, high) in [(0, 200), (0, 60_000), (0, 16_000_000)] {
        let values = ValuesFactory::new().random(low, high).with_len(700).create();
        let (bytes, stats) = ColumnFactory::new()
            .with_values(values.clone())
            .with_log_values_per_chunk(8)
            .with_byte_order(ByteOrder::Big)
            .with_compression(CompressionKind::None)
            .with_codecs(DIRECT_CODECS.to_vec())
            .create_with_stats();
        assert!(stats.usage(IntCodec::BytePack).chunks > 0);

        for strategy in [DecodeStrategy::Block, DecodeStrategy::Buffer, DecodeStrategy::Unsafe] {
            let supplier = ColumnarIntsSupplier::from_bytes(&bytes, Some(strategy)).unwrap();
            assert_eq!(read_each(supplier.get().as_mut()), values, "{strategy} below {high}");
        }
    }
}

#[test]
fn constant_then_ascending_example() {
    let mut values = vec![5; 4096];
    values.extend(1..=1000);
    let bytes = ColumnFactory::new()
        .with_values(values)
        .with_log_values_per_chunk(12)
        .create();

    let supplier = ColumnarIntsSupplier::from_bytes(&bytes, None).unwrap();
    assert_eq!(supplier.header().num_chunks, 2);
    let codecs = supplier.codecs_present();
    assert!(codecs.contains(&IntCodec::Constant));
    assert!(codecs.contains(&IntCodec::Unencoded) || codecs.contains(&IntCodec::Compressed));

    let mut reader = supplier.get();
    assert_eq!(reader.get(4095).unwrap(), 5);
    assert_eq!(reader.get(4096).unwrap(), 1);
    assert_eq!(reader.get(5095).unwrap(), 1000);
    assert!(matches!(
        reader.get(5096),
        Err(ColumnError::OutOfRange {
            index: 5096,
            len: 5096
        })
    ));
}

#[test]
fn zero_column_uses_single_byte_chunk() {
    let bytes = ColumnFactory::new().with_values(vec![0; 1000]).create();
    let supplier = ColumnarIntsSupplier::from_bytes(&bytes, None).unwrap();
    assert_eq!(supplier.codecs_present(), vec![IntCodec::Zero]);
    assert_eq!(bytes.len(), supplier.header().chunk_region_start() + 1);
    assert_eq!(supplier.decode_strategy(), DecodeStrategy::Buffer);
    assert!(read_all(supplier.get().as_mut()).iter().all(|&v| v == 0));
}

#[test]
fn range_and_gather_match_point_reads() {
    let values = ValuesFactory::new().runs(5, 1_000_000).with_len(1000).create();
    for strategy in [None, Some(DecodeStrategy::Block)] {
        let bytes = ColumnFactory::new()
            .with_values(values.clone())
            .with_log_values_per_chunk(7)
            .create();
        let supplier = ColumnarIntsSupplier::from_bytes(&bytes, strategy).unwrap();

        let mut reader = supplier.get();
        let mut out = vec![0; 400];
        reader.get_range(&mut out, 100, 500).unwrap();
        assert_eq!(&out[..], &values[100..500]);

        let mut fresh = supplier.get();
        let mut out = vec![0; 1000];
        fresh.get_range(&mut out, 0, 1000).unwrap();
        assert_eq!(out, values);
        assert_eq!(fresh.chunk_loads(), 8);

        let indices = [0usize, 1, 127, 128, 129, 500, 501, 999];
        let mut gathered = vec![0; indices.len()];
        let mut gatherer = supplier.get();
        gatherer.get_gather(&mut gathered, &indices).unwrap();
        let expected: Vec<i32> = indices.iter().map(|&i| values[i]).collect();
        assert_eq!(gathered, expected);
        assert_eq!(gatherer.chunk_loads(), 4);
    }
}

#[test]
fn range_and_gather_validate_bounds() {
    let bytes = ColumnFactory::new()
        .with_values((0..100).collect())
        .with_log_values_per_chunk(4)
        .create();
    let supplier = ColumnarIntsSupplier::from_bytes(&bytes, None).unwrap();
    let mut reader = supplier.get();
    let mut out = vec![0; 10];

    assert!(matches!(
        reader.get_range(&mut out, 95, 105),
        Err(ColumnError::OutOfRange { .. })
    ));
    assert!(matches!(
        reader.get_range(&mut out, 20, 10),
        Err(ColumnError::OutOfRange { .. })
    ));
    assert!(matches!(
        reader.get_range(&mut out, 0, 11),
        Err(ColumnError::State(_))
    ));
    assert!(matches!(
        reader.get_gather(&mut out, &[3, 100]),
        Err(ColumnError::OutOfRange { index: 100, .. })
    ));
    reader.get_range(&mut out, 50, 50).unwrap();
}

#[test]
fn trailing_single_value_chunk_round_trips() {
    let values = ValuesFactory::new().with_len(257).create();
    let bytes = ColumnFactory::new()
        .with_values(values.clone())
        .with_log_values_per_chunk(8)
        .create();
    let supplier = ColumnarIntsSupplier::from_bytes(&bytes, None).unwrap();
    assert_eq!(supplier.header().num_chunks, 2);
    let mut reader = supplier.get();
    assert_eq!(reader.get(256).unwrap(), values[256]);
    assert_eq!(reader.get(255).unwrap(), values[255]);
}

#[test]
fn direct_override_on_compressed_column_fails_at_open() {
    let values: Vec<i32> = (0..4096).map(|i| 1_000_000 + (i % 4)).collect();
    let bytes = ColumnFactory::new()
        .with_values(values.clone())
        .with_log_values_per_chunk(12)
        .with_compression(CompressionKind::Lz4)
        .create();

    match ColumnarIntsSupplier::from_bytes(&bytes, Some(DecodeStrategy::Unsafe)) {
        Err(ColumnError::CapabilityMismatch { strategy, codec }) => {
            assert_eq!(strategy, DecodeStrategy::Unsafe);
            assert_eq!(codec, IntCodec::Compressed);
        }
        other => panic!("unexpected result: {:?}", other.map(|s| s.decode_strategy())),
    }

    let supplier = ColumnarIntsSupplier::from_bytes(&bytes, Some(DecodeStrategy::Block)).unwrap();
    assert_eq!(read_all(supplier.get().as_mut()), values);
}

#[test]
fn persisted_direct_strategy_on_run_length_column_falls_back_to_block() {
    let values = ValuesFactory::new().runs(30, 4).with_len(2000).create();
    let mut bytes = ColumnFactory::new()
        .with_values(values.clone())
        .with_compression(CompressionKind::None)
        .create();
    assert_eq!(bytes[1], u8::from(DecodeStrategy::Block));

    bytes[1] = u8::from(DecodeStrategy::Unsafe);
    let supplier = ColumnarIntsSupplier::from_bytes(&bytes, None).unwrap();
    assert!(supplier.codecs_present().contains(&IntCodec::RunLength));
    assert_eq!(supplier.decode_strategy(), DecodeStrategy::Block);
    assert_eq!(read_all(supplier.get().as_mut()), values);
}

#[test]
fn unknown_codec_byte_is_a_format_error() {
    let mut bytes = ColumnFactory::new()
        .with_values(vec![1, 2, 3])
        .with_compression(CompressionKind::None)
        .create();
    let region = ColumnDataHeader::read_from(&bytes).unwrap().chunk_region_start();
    bytes[region] = 0x7F;
    assert!(matches!(
        ColumnarIntsSupplier::from_bytes(&bytes, None),
        Err(ColumnError::Format(_))
    ));
}

#[test]
fn truncated_column_is_a_format_error() {
    let bytes = ColumnFactory::new()
        .with_values((0..500).collect())
        .with_compression(CompressionKind::None)
        .create();
    for cut in [0, 5, ColumnDataHeader::LEN + 1, bytes.len() - 1] {
        assert!(matches!(
            ColumnarIntsSupplier::from_bytes(&bytes[..cut], None),
            Err(ColumnError::Format(_))
        ));
    }
}

#[test]
fn supplier_is_read_only() {
    let bytes = ColumnFactory::new().with_values(vec![1, 2, 3]).create();
    let supplier = ColumnarIntsSupplier::from_bytes(&bytes, None).unwrap();
    let mut sink = Vec::new();
    assert!(matches!(
        supplier.write_to(&mut sink),
        Err(ColumnError::Unsupported(_))
    ));
    assert!(sink.is_empty());
}

#[test]
fn readers_run_concurrently_over_shared_bytes() {
    let values = ValuesFactory::new().random(-50, 50).with_len(10_000).create();
    let bytes = ColumnFactory::new()
        .with_values(values.clone())
        .with_log_values_per_chunk(9)
        .with_compression(CompressionKind::None)
        .with_codecs(DIRECT_CODECS.to_vec())
        .create();

    for strategy in [DecodeStrategy::Block, DecodeStrategy::Buffer, DecodeStrategy::Unsafe] {
        let supplier = ColumnarIntsSupplier::from_bytes(&bytes, Some(strategy)).unwrap();
        thread::scope(|scope| {
            for t in 0..4 {
                let supplier = &supplier;
                let values = &values;
                scope.spawn(move || {
                    let mut reader = supplier.get();
                    for i in (t..values.len()).step_by(7) {
                        assert_eq!(reader.get(i).unwrap(), values[i]);
                    }
                });
            }
        });
    }
}
