use std::sync::Arc;

use crate::engine::core::column::compression::Lz4Codec;
use crate::engine::core::column::encoders::{IntFormEncoder, build_encoders, select_encoder};
use crate::engine::core::column::format::{ByteOrder, IntCodec};
use crate::engine::core::column::metrics::{IntFormMetrics, OptimizationTarget};
use crate::engine::errors::ColumnError;

fn metrics_for(values: &[i32], target: OptimizationTarget) -> IntFormMetrics {
    let mut m = IntFormMetrics::new(target);
    for &v in values {
        m.process_next_row(v);
    }
    m
}

fn choose(enabled: &[IntCodec], values: &[i32], target: OptimizationTarget) -> IntCodec {
    let mut encoders = build_encoders(enabled, ByteOrder::Little, None);
    select_encoder(&mut encoders, values, &metrics_for(values, target))
        .unwrap()
        .codec
}

const DEFAULT_SET: [IntCodec; 4] = [
    IntCodec::Zero,
    IntCodec::Constant,
    IntCodec::Unencoded,
    IntCodec::RunLength,
];

#[test]
fn zeros_select_zero_codec() {
    let values = vec![0; 1000];
    for target in [OptimizationTarget::SmallerSize, OptimizationTarget::FasterDecode] {
        assert_eq!(choose(&DEFAULT_SET, &values, target), IntCodec::Zero);
    }
}

#[test]
fn constant_chunk_selects_constant() {
    let values = vec![5; 4096];
    assert_eq!(
        choose(&DEFAULT_SET, &values, OptimizationTarget::SmallerSize),
        IntCodec::Constant
    );
}

#[test]
fn equal_cost_prefers_higher_priority_codec() {
    // constant and unencoded both cost five bytes for one value
    let mut encoders = build_encoders(&DEFAULT_SET, ByteOrder::Little, None);
    let values = [7];
    let choice = select_encoder(
        &mut encoders,
        &values,
        &metrics_for(&values, OptimizationTarget::SmallerSize),
    )
    .unwrap();
    assert_eq!(choice.codec, IntCodec::Constant);
    assert_eq!(choice.size, 5);
}

#[test]
fn distinct_values_fall_back_to_unencoded() {
    let values: Vec<i32> = (1..=1000).collect();
    let mut encoders = build_encoders(&DEFAULT_SET, ByteOrder::Little, None);
    let choice = select_encoder(
        &mut encoders,
        &values,
        &metrics_for(&values, OptimizationTarget::SmallerSize),
    )
    .unwrap();
    assert_eq!(choice.codec, IntCodec::Unencoded);
    assert_eq!(choice.size, 4001);
}

#[test]
fn bytepack_wins_when_enabled_for_small_values() {
    let values: Vec<i32> = (1..=1000).collect();
    let mut enabled = DEFAULT_SET.to_vec();
    enabled.push(IntCodec::BytePack);
    assert_eq!(
        choose(&enabled, &values, OptimizationTarget::SmallerSize),
        IntCodec::BytePack
    );
}

#[test]
fn faster_decode_trades_size_for_simpler_codec() {
    // one run of twenty followed by eighty distinct values
    let mut values = vec![1; 20];
    values.extend(100..180);

    assert_eq!(
        choose(&DEFAULT_SET, &values, OptimizationTarget::SmallerSize),
        IntCodec::RunLength
    );
    assert_eq!(
        choose(&DEFAULT_SET, &values, OptimizationTarget::FasterDecode),
        IntCodec::Unencoded
    );
}

#[test]
fn compressed_wins_on_repetitive_wide_values() {
    let values: Vec<i32> = (0..4096).map(|i| 1_000_000 + (i % 4)).collect();
    let mut enabled = DEFAULT_SET.to_vec();
    enabled.push(IntCodec::Compressed);
    let mut encoders = build_encoders(&enabled, ByteOrder::Little, Some(Arc::new(Lz4Codec)));
    let choice = select_encoder(
        &mut encoders,
        &values,
        &metrics_for(&values, OptimizationTarget::SmallerSize),
    )
    .unwrap();
    assert_eq!(choice.codec, IntCodec::Compressed);
    assert!(choice.size < 4 * values.len());
}

#[test]
fn inapplicable_encoders_are_not_costed() {
    struct Panicky;
    impl IntFormEncoder for Panicky {
        fn codec(&self) -> IntCodec {
            IntCodec::BytePack
        }
        fn is_applicable(&self, _m: &IntFormMetrics) -> bool {
            false
        }
        fn encoded_size(&mut self, _v: &[i32], _m: &IntFormMetrics) -> Result<usize, ColumnError> {
            panic!("cost computed for inapplicable encoder")
        }
        fn encode(
            &mut self,
            _v: &[i32],
            _m: &IntFormMetrics,
            _out: &mut Vec<u8>,
        ) -> Result<(), ColumnError> {
            unreachable!()
        }
        fn speed_modifier(&self) -> f64 {
            1.0
        }
    }

    let mut encoders = build_encoders(&[], ByteOrder::Little, None);
    encoders.push(Box::new(Panicky));
    let values = [1, 2, 3];
    let choice = select_encoder(
        &mut encoders,
        &values,
        &metrics_for(&values, OptimizationTarget::SmallerSize),
    )
    .unwrap();
    assert_eq!(choice.codec, IntCodec::Unencoded);
}

#[test]
fn empty_encoder_set_is_a_state_error() {
    let mut encoders: Vec<Box<dyn IntFormEncoder>> = Vec::new();
    let values = [1];
    let err = select_encoder(
        &mut encoders,
        &values,
        &metrics_for(&values, OptimizationTarget::SmallerSize),
    )
    .unwrap_err();
    assert!(matches!(err, ColumnError::State(_)));
}
