use crate::test_helpers::factories::ValuesFactory;

#[test]
fn same_seed_gives_same_values() {
    let a = ValuesFactory::new().with_len(500).with_seed(7).create();
    let b = ValuesFactory::new().with_len(500).with_seed(7).create();
    let c = ValuesFactory::new().with_len(500).with_seed(8).create();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn patterns_have_expected_shape() {
    assert!(ValuesFactory::new().zeros().with_len(10).create().iter().all(|&v| v == 0));
    assert_eq!(ValuesFactory::new().ascending(5).with_len(3).create(), vec![5, 6, 7]);

    let runs = ValuesFactory::new().runs(8, 3).with_len(257).create();
    assert_eq!(runs.len(), 257);
    assert!(runs.iter().all(|v| (0..=3).contains(v)));

    let small = ValuesFactory::new().random(-10, 10).with_len(100).create();
    assert!(small.iter().all(|v| (-10..=10).contains(v)));
}
