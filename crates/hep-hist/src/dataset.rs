use std::fs;
use std::path::Path;

use hep_core::errors::{ErrorInfo, HepError};
use hep_core::serde::{from_json_slice, to_canonical_json_bytes};
use hep_core::{RunProvenance, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::set::HistogramSet;

fn io_error(code: &str, err: impl ToString, path: &Path) -> HepError {
    HepError::Serde(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Generated distributions together with the provenance of the run that filled them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetFile {
    /// Schema version of the persisted payload.
    #[serde(default)]
    pub schema_version: SchemaVersion,
    /// Run that produced the distributions.
    pub provenance: RunProvenance,
    /// Filled distributions keyed by name.
    pub distributions: HistogramSet,
}

impl DatasetFile {
    /// Bundles distributions with their provenance under the current schema.
    pub fn new(provenance: RunProvenance, distributions: HistogramSet) -> Self {
        Self {
            schema_version: SchemaVersion::default(),
            provenance,
            distributions,
        }
    }

    /// Writes the dataset as canonical JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), HepError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|err| io_error("dataset-mkdir", err, parent))?;
            }
        }
        let bytes = to_canonical_json_bytes(self).map_err(|err| {
            let info = err.info().clone().with_context("path", path.display().to_string());
            HepError::Serde(info)
        })?;
        fs::write(path, bytes).map_err(|err| io_error("dataset-write", err, path))
    }

    /// Loads a dataset written by [`DatasetFile::save`].
    pub fn load(path: &Path) -> Result<Self, HepError> {
        let bytes = fs::read(path).map_err(|err| io_error("dataset-read", err, path))?;
        let dataset: DatasetFile = from_json_slice(&bytes).map_err(|err| {
            let info = err.info().clone().with_context("path", path.display().to_string());
            HepError::Serde(info)
        })?;
        if !dataset.schema_version.is_readable() {
            return Err(HepError::Serde(
                ErrorInfo::new("dataset-schema", "unsupported dataset schema version")
                    .with_context("path", path.display().to_string())
                    .with_context("major", dataset.schema_version.major.to_string()),
            ));
        }
        Ok(dataset)
    }
}
