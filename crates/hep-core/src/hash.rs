//! Content hashing for configs, datasets and reports.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::HepError;
use crate::serde::to_canonical_json_bytes;

/// Computes a stable SHA256 hash for the provided serializable value.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, HepError> {
    let bytes = to_canonical_json_bytes(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Rounds a floating point value to the precision used in persisted reports.
pub fn round_f64(value: f64) -> f64 {
    let scaled = (value * 1e9).round();
    scaled / 1e9
}
