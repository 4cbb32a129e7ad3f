use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use hep_core::errors::{ErrorInfo, HepError};
use hep_core::serde::from_yaml_slice;
use hep_core::stable_hash_string;
use hep_hist::DistributionSpec;
use serde::{Deserialize, Serialize};

use crate::catalog::{
    KAON_MINUS, KAON_PLUS, K_STAR, PION_MINUS, PION_PLUS, PROTON_MINUS, PROTON_PLUS,
};
use crate::observables;

fn config_error(code: &str, message: impl Into<String>) -> HepError {
    HepError::Config(ErrorInfo::new(code, message))
}

/// Stopping rule for the per-event accumulation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryConvention {
    /// Keep sampling while the event holds at most `target` particles, yielding `target + 1`.
    #[default]
    Inclusive,
    /// Keep sampling while the event holds fewer than `target` particles.
    Exact,
}

impl BoundaryConvention {
    /// Whether another particle must be drawn for an event currently holding `count`.
    pub fn needs_more(self, count: usize, target: usize) -> bool {
        match self {
            BoundaryConvention::Inclusive => count <= target,
            BoundaryConvention::Exact => count < target,
        }
    }

    /// Nominal final-state multiplicity for a given target.
    pub fn effective_particles(self, target: usize) -> usize {
        match self {
            BoundaryConvention::Inclusive => target + 1,
            BoundaryConvention::Exact => target,
        }
    }
}

/// One row of the categorical species table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesWeight {
    /// Registered species name.
    pub name: String,
    /// Probability of drawing the species.
    pub probability: f64,
}

impl SpeciesWeight {
    fn new(name: &str, probability: f64) -> Self {
        Self {
            name: name.to_string(),
            probability,
        }
    }
}

/// Two-body decay channel `parent -> first + second`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecayChannel {
    /// First daughter species.
    pub first: String,
    /// Second daughter species.
    pub second: String,
}

impl DecayChannel {
    fn new(first: &str, second: &str) -> Self {
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed; partitioned workers derive substreams from it.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in dataset provenance.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x0C01_11DE_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

/// YAML-configurable parameters of a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of events to generate.
    #[serde(default = "default_events")]
    pub events: u64,
    /// Target number of final-state particles per event.
    #[serde(default = "default_particles_per_event")]
    pub particles_per_event: usize,
    /// Accumulation stopping rule.
    #[serde(default)]
    pub boundary: BoundaryConvention,
    /// Categorical species table; probabilities must sum to one.
    #[serde(default = "default_species")]
    pub species: Vec<SpeciesWeight>,
    /// Decay channels keyed by resonance name, chosen with equal probability.
    #[serde(default = "default_decay_channels")]
    pub decay_channels: BTreeMap<String, Vec<DecayChannel>>,
    /// Species counted as pions in pion/kaon pair classification.
    #[serde(default = "default_pion_species")]
    pub pion_species: Vec<String>,
    /// Species counted as kaons in pion/kaon pair classification.
    #[serde(default = "default_kaon_species")]
    pub kaon_species: Vec<String>,
    /// Domain and binning of every filled distribution.
    #[serde(default = "observables::default_specs")]
    pub distributions: BTreeMap<String, DistributionSpec>,
    /// Master seed and label.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Number of worker partitions (1 runs the sequential reference loop).
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_events() -> u64 {
    100_000
}

fn default_particles_per_event() -> usize {
    100
}

fn default_workers() -> usize {
    1
}

fn default_species() -> Vec<SpeciesWeight> {
    vec![
        SpeciesWeight::new(PION_PLUS, 0.40),
        SpeciesWeight::new(PION_MINUS, 0.40),
        SpeciesWeight::new(KAON_PLUS, 0.05),
        SpeciesWeight::new(KAON_MINUS, 0.05),
        SpeciesWeight::new(PROTON_PLUS, 0.045),
        SpeciesWeight::new(PROTON_MINUS, 0.045),
        SpeciesWeight::new(K_STAR, 0.01),
    ]
}

fn default_decay_channels() -> BTreeMap<String, Vec<DecayChannel>> {
    let mut channels = BTreeMap::new();
    channels.insert(
        K_STAR.to_string(),
        vec![
            DecayChannel::new(PION_PLUS, KAON_MINUS),
            DecayChannel::new(PION_MINUS, KAON_PLUS),
        ],
    );
    channels
}

fn default_pion_species() -> Vec<String> {
    vec![PION_PLUS.to_string(), PION_MINUS.to_string()]
}

fn default_kaon_species() -> Vec<String> {
    vec![KAON_PLUS.to_string(), KAON_MINUS.to_string()]
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            events: default_events(),
            particles_per_event: default_particles_per_event(),
            boundary: BoundaryConvention::default(),
            species: default_species(),
            decay_channels: default_decay_channels(),
            pion_species: default_pion_species(),
            kaon_species: default_kaon_species(),
            distributions: observables::default_specs(),
            seed_policy: SeedPolicy::default(),
            workers: default_workers(),
        }
    }
}

impl GeneratorConfig {
    /// Parses a YAML document; omitted fields take their defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, HepError> {
        from_yaml_slice(contents.as_bytes())
    }

    /// Loads a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, HepError> {
        let bytes = fs::read(path).map_err(|err| {
            HepError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        from_yaml_slice(&bytes).map_err(|err| {
            HepError::Config(err.info().clone().with_context("path", path.display().to_string()))
        })
    }

    /// Checks the shape of the configuration without consulting a registry.
    pub fn validate(&self) -> Result<(), HepError> {
        if self.particles_per_event == 0 {
            return Err(config_error(
                "particles-per-event",
                "target particles per event must be positive",
            ));
        }
        if self.workers == 0 {
            return Err(config_error("workers", "worker count must be positive"));
        }
        if self.workers as u64 > self.events.max(1) {
            return Err(HepError::Config(
                ErrorInfo::new("workers", "more workers than events")
                    .with_context("workers", self.workers.to_string())
                    .with_context("events", self.events.to_string()),
            ));
        }
        let missing: Vec<&str> = observables::required()
            .filter(|name| !self.distributions.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(HepError::Config(
                ErrorInfo::new("missing-distribution", "distribution table is incomplete")
                    .with_context("missing", missing.join(","))
                    .with_hint("omit `distributions` to use the default binning"),
            ));
        }
        Ok(())
    }

    /// Content hash recorded in dataset provenance.
    pub fn config_hash(&self) -> Result<String, HepError> {
        stable_hash_string(self)
    }
}
