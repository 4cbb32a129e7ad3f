use std::fs;
use std::process::Command;

use serde_json::Value;

const RELAXED_POLICY: &str =
    "entry_rel_tol: 0.3\ncomposition_tol_pp: 5.0\nfits: []\nresonance: null\n";

fn hepsim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hepsim"))
}

#[test]
fn types_lists_the_catalog() {
    let output = hepsim().arg("types").output().unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert_eq!(text.lines().count(), 7);
    assert!(text.lines().any(|line| line.starts_with("[6] name: k*")));
}

#[test]
fn run_writes_dataset_report_and_csv() {
    let dir = tempfile::tempdir().unwrap();
    let policy = dir.path().join("policy.yaml");
    fs::write(
        &policy,
        RELAXED_POLICY,
    )
    .unwrap();
    let out = dir.path().join("out");
    let csv = dir.path().join("checks.csv");

    let output = hepsim()
        .args(["--log-level", "warn", "run", "--events", "2000", "--workers", "2", "--seed", "7"])
        .arg("--policy")
        .arg(&policy)
        .arg("--out")
        .arg(&out)
        .arg("--csv")
        .arg(&csv)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let summary: Value =
        serde_json::from_slice(&fs::read(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["seed"], 7);
    assert_eq!(summary["counters"]["events"], 2000);
    let report: Value =
        serde_json::from_slice(&fs::read(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["issues"].as_array().unwrap().len(), 0);
    assert!(out.join("dataset.json").exists());

    let rows = fs::read_to_string(&csv).unwrap();
    // Header, twelve entry checks and seven species.
    assert_eq!(rows.lines().count(), 20);
}

#[test]
fn analyze_flags_a_foreign_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("gen");
    let status = hepsim()
        .args(["generate", "--events", "200", "--seed", "1"])
        .arg("--out")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let output = hepsim()
        .args(["analyze", "--events", "200", "--seed", "2"])
        .arg("--dataset")
        .arg(out.join("dataset.json"))
        .arg("--out")
        .arg(dir.path().join("ana"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let report_path = dir.path().join("ana").join("report.json");
    let report: Value = serde_json::from_slice(&fs::read(report_path).unwrap()).unwrap();
    let codes: Vec<_> = report["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["code"].as_str().unwrap().to_string())
        .collect();
    assert!(codes.contains(&"config-hash".to_string()));
}

#[test]
fn recorded_config_reproduces_the_hash() {
    let dir = tempfile::tempdir().unwrap();
    let policy = dir.path().join("policy.yaml");
    fs::write(&policy, RELAXED_POLICY).unwrap();
    let out = dir.path().join("gen");
    let status = hepsim()
        .args(["generate", "--events", "2000", "--seed", "11", "--workers", "3"])
        .arg("--out")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let output = hepsim()
        .arg("analyze")
        .arg("--config")
        .arg(out.join("config.yaml"))
        .arg("--dataset")
        .arg(out.join("dataset.json"))
        .arg("--policy")
        .arg(&policy)
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}
