use std::collections::BTreeMap;

use hep_core::RunProvenance;
use hep_hist::{DatasetFile, DistributionSink, DistributionSource, DistributionSpec, HistogramSet};
use tempfile::tempdir;

fn filled_set() -> HistogramSet {
    let mut specs = BTreeMap::new();
    specs.insert("pulse".to_string(), DistributionSpec::new(0.0, 7.0, 70));
    specs.insert(
        "inv_mass_discordant".to_string(),
        DistributionSpec::new(0.0, 4.0, 400).with_sumw2(),
    );
    let mut set = HistogramSet::from_specs(&specs).unwrap();
    for step in 0..500 {
        let x = step as f64 * 0.013;
        set.fill("pulse", x).unwrap();
        set.fill("inv_mass_discordant", 0.89 + (x - 3.0) * 0.01).unwrap();
    }
    set
}

#[test]
fn dataset_survives_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("dataset.json");
    let provenance = RunProvenance::now("cfg-hash", 42, 1, 500);
    let dataset = DatasetFile::new(provenance, filled_set());

    dataset.save(&path).unwrap();
    let loaded = DatasetFile::load(&path).unwrap();

    assert_eq!(loaded, dataset);
    assert_eq!(loaded.distributions.entries("pulse").unwrap(), 500);
    assert!(loaded
        .distributions
        .sum_w2("inv_mass_discordant", 389)
        .unwrap()
        .is_some());
}

#[test]
fn saving_twice_produces_identical_bytes() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("a.json");
    let second = dir.path().join("b.json");
    let dataset = DatasetFile::new(RunProvenance::now("cfg", 7, 2, 500), filled_set());

    dataset.save(&first).unwrap();
    dataset.save(&second).unwrap();

    assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
}

#[test]
fn loading_missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = DatasetFile::load(&path).unwrap_err();
    assert_eq!(err.info().code, "dataset-read");
    assert!(err.info().context.contains_key("path"));
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.json");
    std::fs::write(&path, b"{\"schema_version\":").unwrap();
    let err = DatasetFile::load(&path).unwrap_err();
    assert!(matches!(err, hep_core::HepError::Serde(_)));
}

fn tampered_load(edit: impl FnOnce(&mut serde_json::Value)) -> hep_core::HepError {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tampered.json");
    let dataset = DatasetFile::new(RunProvenance::now("cfg", 7, 1, 500), filled_set());
    dataset.save(&path).unwrap();

    let mut value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    edit(&mut value);
    std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();
    DatasetFile::load(&path).unwrap_err()
}

#[test]
fn distribution_without_bins_is_rejected_on_load() {
    let err = tampered_load(|value| {
        value["distributions"]["pulse"]["contents"] = serde_json::json!([]);
    });
    assert!(matches!(err, hep_core::HepError::Serde(_)));
    assert!(err.info().message.contains("zero-bins"));
}

#[test]
fn inverted_domain_is_rejected_on_load() {
    let err = tampered_load(|value| {
        value["distributions"]["pulse"]["min"] = serde_json::json!(9.0);
    });
    assert!(err.info().message.contains("invalid-domain"));
}

#[test]
fn squared_weights_must_match_bin_count() {
    let err = tampered_load(|value| {
        let sum_w2 = &mut value["distributions"]["inv_mass_discordant"]["sum_w2"];
        sum_w2.as_array_mut().unwrap().push(serde_json::json!(1.0));
    });
    assert!(err.info().message.contains("sum-w2-length"));
}
