use crate::engine::core::column::format::{ColumnDataHeader, IntCodec};
use crate::test_helpers::factory::Factory;

#[test]
fn builds_a_parseable_column() {
    let values = Factory::values().ascending(0).with_len(300).create();
    let (bytes, stats) = Factory::column()
        .with_values(values)
        .with_log_values_per_chunk(7)
        .create_with_stats();

    let header = ColumnDataHeader::read_from(&bytes).unwrap();
    assert_eq!(header.num_values, 300);
    assert_eq!(header.num_chunks, 3);
    assert_eq!(stats.total_chunks(), 3);
    assert_eq!(stats.usage(IntCodec::Zero).chunks, 0);
}
