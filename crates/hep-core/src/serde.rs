//! Canonical JSON and YAML helpers.
//!
//! Canonical JSON has object keys in lexicographic order at every depth and no
//! insignificant whitespace; hashes and persisted files are computed over it.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{ErrorInfo, HepError};

fn serde_error(code: &str, err: impl ToString) -> HepError {
    HepError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Encodes `value` as canonical JSON.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, HepError> {
    // `serde_json::Map` is ordered by key unless `preserve_order` is enabled,
    // so going through `Value` sorts every nested object.
    let tree = serde_json::to_value(value).map_err(|err| serde_error("json_serialize", err))?;
    serde_json::to_vec(&tree).map_err(|err| serde_error("json_write", err))
}

/// Decodes JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, HepError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json_deserialize", err))
}

/// Encodes `value` as YAML, e.g. to record a resolved configuration.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, HepError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml_serialize", err))
}

/// Decodes YAML bytes.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, HepError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml_deserialize", err))
}
