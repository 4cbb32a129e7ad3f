use std::collections::BTreeMap;

use hep_hist::{DistributionSink, DistributionSource, DistributionSpec, HistogramSet};

fn empty_set() -> HistogramSet {
    let mut specs = BTreeMap::new();
    specs.insert("zenith".to_string(), DistributionSpec::new(0.0, 3.2, 32));
    specs.insert("pulse".to_string(), DistributionSpec::new(0.0, 7.0, 70).with_sumw2());
    HistogramSet::from_specs(&specs).unwrap()
}

fn fill(set: &mut HistogramSet, values: &[f64]) {
    for &value in values {
        set.fill("zenith", value).unwrap();
        set.fill("pulse", value * 2.0).unwrap();
    }
}

#[test]
fn merge_is_order_independent() {
    let a_values = [0.1, 0.5, 1.2, 3.3];
    let b_values = [0.4, 2.9, 3.1];

    let mut a = empty_set();
    fill(&mut a, &a_values);
    let mut b = empty_set();
    fill(&mut b, &b_values);

    let mut ab = a.clone();
    ab.merge(&b).unwrap();
    let mut ba = b.clone();
    ba.merge(&a).unwrap();

    assert_eq!(ab, ba);
    assert_eq!(ab.entries("zenith").unwrap(), 7);
}

#[test]
fn merged_partitions_match_single_fill() {
    let values: Vec<f64> = (0..200).map(|i| (i as f64 * 0.37) % 3.2).collect();

    let mut whole = empty_set();
    fill(&mut whole, &values);

    let mut merged = empty_set();
    for chunk in values.chunks(37) {
        let mut part = empty_set();
        fill(&mut part, chunk);
        merged.merge(&part).unwrap();
    }

    assert_eq!(merged, whole);
}

#[test]
fn mismatched_binning_is_rejected() {
    let mut a = empty_set();
    let mut specs = BTreeMap::new();
    specs.insert("zenith".to_string(), DistributionSpec::new(0.0, 3.2, 16));
    specs.insert("pulse".to_string(), DistributionSpec::new(0.0, 7.0, 70));
    let b = HistogramSet::from_specs(&specs).unwrap();

    let err = a.merge(&b).unwrap_err();
    assert_eq!(err.info().code, "layout-mismatch");
}
