//! Shared error taxonomy, deterministic RNG handle, provenance records and
//! canonical serialization helpers for the hepsim workspace.
#![deny(missing_docs)]

pub mod errors;
pub mod hash;
pub mod provenance;
pub mod rng;
pub mod serde;

pub use errors::{ErrorInfo, HepError};
pub use hash::stable_hash_string;
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, HepError>;
