use hep_core::provenance::{RunProvenance, SchemaVersion};
use hep_core::serde::{from_json_slice, to_canonical_json_bytes};
use hep_core::stable_hash_string;

#[test]
fn provenance_round_trip_json() {
    let mut provenance = RunProvenance::now("cfg-hash", 99, 4, 1000);
    provenance.seed_label = Some("nightly".into());

    let bytes = to_canonical_json_bytes(&provenance).expect("serialize");
    let decoded: RunProvenance = from_json_slice(&bytes).expect("deserialize");

    assert_eq!(decoded, provenance);
    assert!(decoded.tool_versions.contains_key("hep-core"));
}

#[test]
fn canonical_bytes_sort_keys() {
    let value = serde_json::json!({"b": 1, "a": {"d": 2, "c": 3}});
    let bytes = to_canonical_json_bytes(&value).expect("serialize");
    assert_eq!(
        String::from_utf8(bytes).expect("utf8"),
        r#"{"a":{"c":3,"d":2},"b":1}"#
    );
}

#[test]
fn stable_hash_ignores_key_order() {
    let first = serde_json::json!({"x": 1.5, "y": [1, 2]});
    let second = serde_json::json!({"y": [1, 2], "x": 1.5});
    assert_eq!(
        stable_hash_string(&first).expect("hash"),
        stable_hash_string(&second).expect("hash")
    );
    assert_eq!(SchemaVersion::default(), SchemaVersion::new(1, 0, 0));
}

#[test]
fn yaml_round_trip_preserves_provenance() {
    let provenance = RunProvenance::now("cfg-hash", 7, 1, 10);
    let text = hep_core::serde::to_yaml_string(&provenance).expect("yaml");
    let decoded: RunProvenance = hep_core::serde::from_yaml_slice(text.as_bytes()).expect("parse");
    assert_eq!(decoded, provenance);
}
