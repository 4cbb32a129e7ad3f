use std::sync::OnceLock;

use hep_ana::{analyze, FitOutcome, ValidationPolicy, ValidationReport};
use hep_gen::{generate, standard_registry, GeneratorConfig};
use hep_hist::DatasetFile;

fn validated_run() -> &'static ValidationReport {
    static REPORT: OnceLock<ValidationReport> = OnceLock::new();
    REPORT.get_or_init(full_run)
}

fn full_run() -> ValidationReport {
    let registry = standard_registry().unwrap();
    let config = GeneratorConfig {
        events: 50_000,
        particles_per_event: 10,
        workers: 4,
        ..GeneratorConfig::default()
    };
    let dataset = generate(&registry, &config)
        .unwrap()
        .into_dataset(&config)
        .unwrap();
    analyze(ValidationPolicy::default(), config, &registry, dataset).unwrap()
}

#[test]
fn generated_dataset_meets_expectations() {
    let report = validated_run();

    assert_eq!(report.entries.len(), 12);
    for check in &report.entries {
        assert!(check.pass, "{check:?}");
    }
    assert_eq!(report.composition.len(), 7);
    for check in &report.composition {
        assert!(check.pass, "{check:?}");
    }
    assert!(!report.issues.iter().any(|issue| issue.code == "config-hash"));

    for record in report.fits.iter().filter(|record| record.label != "inv-mass-siblings") {
        assert!(matches!(record.outcome, FitOutcome::Resolved(_)), "{record:?}");
    }
    let pulse = report
        .fits
        .iter()
        .find(|record| record.label == "pulse")
        .and_then(|record| record.result())
        .unwrap();
    let slope = pulse.parameter("p1").unwrap().value;
    assert!((slope + 1.0).abs() < 0.05, "slope {slope}");
}

#[test]
fn resonance_is_visible_in_difference_spectra() {
    let report = validated_run();
    let resonance = report.resonance.as_ref().unwrap();
    assert_eq!(resonance.species, "k*");
    assert_eq!(resonance.fits.len(), 2);
    let mass = resonance.mass.unwrap();
    assert!((mass - 0.89166).abs() < 0.03, "mass {mass}");
}

#[test]
fn report_persists_canonically() {
    let report = validated_run();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports").join("validation.json");
    report.save(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), report.to_bytes().unwrap());
    let restored: ValidationReport =
        hep_core::serde::from_json_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(restored.analysis_hash, report.analysis_hash);
}

#[test]
fn dataset_on_disk_validates_like_in_memory() {
    let registry = standard_registry().unwrap();
    let config = GeneratorConfig {
        events: 2_000,
        particles_per_event: 10,
        ..GeneratorConfig::default()
    };
    let dataset = generate(&registry, &config)
        .unwrap()
        .into_dataset(&config)
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataset.json");
    dataset.save(&path).unwrap();
    let reloaded = DatasetFile::load(&path).unwrap();

    let direct = analyze(ValidationPolicy::default(), config.clone(), &registry, dataset).unwrap();
    let from_disk = analyze(ValidationPolicy::default(), config, &registry, reloaded).unwrap();
    assert_eq!(direct.entries, from_disk.entries);
    assert_eq!(direct.composition, from_disk.composition);
}
