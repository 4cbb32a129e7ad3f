//! Event generation: species sampling, resonance decays and pairwise
//! invariant-mass classification.
#![deny(missing_docs)]

/// Standard particle catalog.
pub mod catalog;
/// YAML-configurable generator settings.
pub mod config;
/// Event container and pair classification.
pub mod event;
/// Sequential event generator.
pub mod generator;
/// Observable names and default binning.
pub mod observables;
/// Partitioned generation across worker threads.
pub mod parallel;
/// Categorical species sampler.
pub mod species;

pub use catalog::standard_registry;
pub use config::{BoundaryConvention, DecayChannel, GeneratorConfig, SeedPolicy, SpeciesWeight};
pub use event::{ChargeClass, Event, PairClassifier};
pub use generator::{generate_sequential, EventGenerator, GenerationOutput, RunSummary};
pub use parallel::{generate, generate_partitioned, partition_events};
pub use species::SpeciesTable;
