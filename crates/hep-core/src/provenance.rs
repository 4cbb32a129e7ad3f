//! Provenance and schema descriptors attached to persisted artefacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the persisted dataset and report layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Bumped when readers of older files must reject newer ones.
    pub major: u32,
    /// Bumped when fields are added.
    pub minor: u32,
    /// Bumped for fixes that leave the layout untouched.
    pub patch: u32,
}

impl SchemaVersion {
    /// Layout written by this build.
    pub const CURRENT: SchemaVersion = SchemaVersion::new(1, 0, 0);

    /// Builds a version triple.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch }
    }

    /// Whether a file with this version can be read by this build.
    pub fn is_readable(&self) -> bool {
        self.major == Self::CURRENT.major
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// Provenance information attached to every generated dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Hash of the generator configuration used to produce the data.
    pub config_hash: String,
    /// Master seed used for all randomness.
    pub seed: u64,
    /// Optional seed label copied from the configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_label: Option<String>,
    /// Number of worker partitions the events were split across.
    pub workers: usize,
    /// Number of simulated events.
    pub events: u64,
    /// RFC 3339 timestamp recording when the artefact was generated.
    pub created_at: String,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}

impl RunProvenance {
    /// Creates provenance stamped with the current UTC time.
    pub fn now(config_hash: impl Into<String>, seed: u64, workers: usize, events: u64) -> Self {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        Self {
            config_hash: config_hash.into(),
            seed,
            seed_label: None,
            workers,
            events,
            created_at: chrono::Utc::now().to_rfc3339(),
            tool_versions,
        }
    }
}
