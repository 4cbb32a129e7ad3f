use std::collections::BTreeMap;

use hep_core::errors::{ErrorInfo, HepError};
use hep_core::{RngHandle, RunProvenance};
use hep_hist::{DatasetFile, DistributionSink, HistogramSet};
use hep_kin::{kinematics, sampling, Momentum, Particle, ParticleRegistry, TypeIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{BoundaryConvention, GeneratorConfig};
use crate::event::{ChargeClass, Event, PairClassifier};
use crate::observables::*;
use crate::species::SpeciesTable;

/// Counters accumulated while generating events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Completed events.
    pub events: u64,
    /// Species draws, including resonances that decayed.
    pub draws: u64,
    /// Final-state particles appended to events.
    pub particles: u64,
    /// Pairs visited by the pairwise pass.
    pub pairs: u64,
    /// Successful resonance decays.
    pub decays: u64,
    /// Resonances whose smeared mass fell below the channel threshold.
    pub forbidden_decays: u64,
}

impl RunSummary {
    /// Adds the counters of another run.
    pub fn absorb(&mut self, other: &RunSummary) {
        self.events += other.events;
        self.draws += other.draws;
        self.particles += other.particles;
        self.pairs += other.pairs;
        self.decays += other.decays;
        self.forbidden_decays += other.forbidden_decays;
    }
}

type Channel = (TypeIndex, TypeIndex);

fn resolve_channels(
    registry: &ParticleRegistry,
    config: &GeneratorConfig,
    species: &SpeciesTable,
) -> Result<BTreeMap<TypeIndex, Vec<Channel>>, HepError> {
    let mut resolved = BTreeMap::new();
    for (parent_name, channels) in &config.decay_channels {
        let parent = registry.find_type(parent_name)?;
        let descriptor = registry.get(parent)?;
        if !descriptor.is_resonance() {
            return Err(HepError::KinematicallyForbidden(
                ErrorInfo::new("stable-parent", "decay channels configured for a stable species")
                    .with_context("species", parent_name.as_str()),
            ));
        }
        let mut list = Vec::with_capacity(channels.len());
        for channel in channels {
            list.push((registry.find_type(&channel.first)?, registry.find_type(&channel.second)?));
        }
        if !list.is_empty() {
            resolved.insert(parent, list);
        }
    }

    for &(index, probability) in species.entries() {
        let descriptor = registry.get(index)?;
        if probability <= 0.0 || !descriptor.is_resonance() {
            continue;
        }
        let open = match resolved.get(&index) {
            Some(list) => list.iter().try_fold(false, |open, &(a, b)| {
                let threshold = registry.get(a)?.mass() + registry.get(b)?.mass();
                Ok::<_, HepError>(open || threshold <= descriptor.mass())
            })?,
            None => false,
        };
        if !open {
            return Err(HepError::KinematicallyForbidden(
                ErrorInfo::new(
                    "channel-threshold",
                    "resonance has no kinematically open decay channel",
                )
                .with_context("species", descriptor.name())
                .with_context("mass", descriptor.mass().to_string())
                .with_hint("add a decay channel whose daughter masses fit the nominal mass"),
            ));
        }
    }
    Ok(resolved)
}

/// Sequential Monte Carlo event generator.
///
/// Each event is filled particle by particle from the species table until the
/// boundary convention is satisfied; resonances are replaced by their decay
/// daughters. All unordered pairs of the finished event are then classified
/// by charge and pion/kaon content.
#[derive(Debug)]
pub struct EventGenerator<'r> {
    registry: &'r ParticleRegistry,
    species: SpeciesTable,
    channels: BTreeMap<TypeIndex, Vec<Channel>>,
    classifier: PairClassifier,
    boundary: BoundaryConvention,
    target: usize,
    event: Event,
    summary: RunSummary,
}

impl<'r> EventGenerator<'r> {
    /// Validates the configuration and resolves every species name once.
    pub fn new(registry: &'r ParticleRegistry, config: &GeneratorConfig) -> Result<Self, HepError> {
        config.validate()?;
        let species = SpeciesTable::new(registry, &config.species)?;
        let channels = resolve_channels(registry, config, &species)?;
        let classifier = PairClassifier::new(registry, &config.pion_species, &config.kaon_species)?;
        let capacity = config.boundary.effective_particles(config.particles_per_event) + 1;
        Ok(Self {
            registry,
            species,
            channels,
            classifier,
            boundary: config.boundary,
            target: config.particles_per_event,
            event: Event::with_capacity(capacity),
            summary: RunSummary::default(),
        })
    }

    /// Counters accumulated since the last call to [`EventGenerator::run`].
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Samples one event and fills the single-particle and sibling observables.
    pub fn generate_event<R, S>(&mut self, rng: &mut R, sink: &mut S) -> Result<&Event, HepError>
    where
        R: Rng + ?Sized,
        S: DistributionSink + ?Sized,
    {
        self.event.clear();
        while self.boundary.needs_more(self.event.len(), self.target) {
            let index = self.species.sample(rng);
            let phi = sampling::azimuth(rng);
            let theta = sampling::zenith(rng);
            let pulse = sampling::exponential(rng, 1.0);
            let momentum = Momentum::new(
                pulse * theta.sin() * phi.cos(),
                pulse * theta.sin() * phi.sin(),
                pulse * theta.cos(),
            );
            let particle = Particle::new(index, momentum);
            self.summary.draws += 1;

            sink.fill(SPECIES, index.as_raw() as f64)?;
            sink.fill(ZENITH, theta)?;
            sink.fill(AZIMUTH, phi)?;
            sink.fill(PULSE, pulse)?;
            sink.fill(TRANSVERSE_PULSE, particle.transverse_momentum())?;
            sink.fill(ENERGY, particle.energy(self.registry)?)?;

            let channel = self
                .channels
                .get(&index)
                .map(|list| list[rng.gen_range(0..list.len())]);
            match channel {
                Some((first, second)) => {
                    self.decay_into_event(&particle, first, second, rng, sink)?
                }
                None => {
                    self.event.push(particle);
                    self.summary.particles += 1;
                }
            }
        }
        Ok(&self.event)
    }

    fn decay_into_event<R, S>(
        &mut self,
        parent: &Particle,
        first: TypeIndex,
        second: TypeIndex,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<(), HepError>
    where
        R: Rng + ?Sized,
        S: DistributionSink + ?Sized,
    {
        match parent.decay(self.registry, first, second, rng) {
            Ok((a, b)) => {
                sink.fill(INV_MASS_SIBLINGS, a.invariant_mass(&b, self.registry)?)?;
                self.event.push(a);
                self.event.push(b);
                self.summary.particles += 2;
                self.summary.decays += 1;
                Ok(())
            }
            Err(HepError::KinematicallyForbidden(info)) => {
                self.summary.forbidden_decays += 1;
                tracing::debug!(
                    code = %info.code,
                    context = ?info.context,
                    "resonance decay rejected"
                );
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    /// Classifies every unordered pair of the current event and fills the
    /// invariant-mass observables; returns the number of pairs visited.
    pub fn process_pairs<S>(&mut self, sink: &mut S) -> Result<u64, HepError>
    where
        S: DistributionSink + ?Sized,
    {
        let registry = self.registry;
        let particles = self.event.particles();
        let resolved = particles
            .iter()
            .map(|particle| {
                let species = particle.species(registry)?;
                Ok((species.mass(), species.charge()))
            })
            .collect::<Result<Vec<(f64, i32)>, HepError>>()?;

        let mut pairs = 0u64;
        for i in 0..particles.len() {
            let (mass_a, charge_a) = resolved[i];
            let a = &particles[i];
            for j in (i + 1)..particles.len() {
                let (mass_b, charge_b) = resolved[j];
                let b = &particles[j];
                let mass = kinematics::invariant_mass(mass_a, a.momentum(), mass_b, b.momentum());
                sink.fill(INV_MASS, mass)?;

                let class = ChargeClass::of(charge_a, charge_b);
                match class {
                    ChargeClass::Discordant => sink.fill(INV_MASS_DISCORDANT, mass)?,
                    ChargeClass::Concordant => sink.fill(INV_MASS_CONCORDANT, mass)?,
                    ChargeClass::Neutral => {}
                }
                if self.classifier.is_pion_kaon(a.type_index(), b.type_index()) {
                    match class {
                        ChargeClass::Discordant => sink.fill(INV_MASS_DISCORDANT_PK, mass)?,
                        ChargeClass::Concordant => sink.fill(INV_MASS_CONCORDANT_PK, mass)?,
                        ChargeClass::Neutral => {}
                    }
                }
                pairs += 1;
            }
        }
        self.summary.pairs += pairs;
        Ok(pairs)
    }

    /// Generates `events` events, logging progress every ten percent.
    pub fn run<R, S>(
        &mut self,
        events: u64,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<RunSummary, HepError>
    where
        R: Rng + ?Sized,
        S: DistributionSink + ?Sized,
    {
        let span = tracing::info_span!("generate", events, target = self.target);
        let _guard = span.enter();
        self.summary = RunSummary::default();
        let step = (events / 10).max(1);
        for completed in 1..=events {
            self.generate_event(rng, sink)?;
            self.process_pairs(sink)?;
            self.summary.events += 1;
            if completed % step == 0 {
                let percent = completed * 100 / events;
                tracing::info!(completed, percent, "generation progress");
            }
        }
        if self.summary.forbidden_decays > 0 {
            tracing::warn!(
                rejected = self.summary.forbidden_decays,
                "resonance decays rejected below threshold"
            );
        }
        Ok(self.summary.clone())
    }
}

/// Distributions and counters produced by a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutput {
    /// Filled distributions.
    pub distributions: HistogramSet,
    /// Run counters summed over all workers.
    pub summary: RunSummary,
    /// Master seed of the run.
    pub seed: u64,
    /// Number of worker partitions.
    pub workers: usize,
}

impl GenerationOutput {
    /// Bundles the distributions with provenance derived from `config`.
    pub fn into_dataset(self, config: &GeneratorConfig) -> Result<DatasetFile, HepError> {
        let mut provenance =
            RunProvenance::now(config.config_hash()?, self.seed, self.workers, self.summary.events);
        provenance.seed_label = config.seed_policy.label.clone();
        provenance.tool_versions.insert(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        Ok(DatasetFile::new(provenance, self.distributions))
    }
}

/// Runs the single-threaded reference loop seeded with the master seed.
pub fn generate_sequential(
    registry: &ParticleRegistry,
    config: &GeneratorConfig,
) -> Result<GenerationOutput, HepError> {
    let mut generator = EventGenerator::new(registry, config)?;
    let mut distributions = HistogramSet::from_specs(&config.distributions)?;
    let seed = config.seed_policy.master_seed;
    let mut rng = RngHandle::from_seed(seed);
    let summary = generator.run(config.events, &mut rng, &mut distributions)?;
    Ok(GenerationOutput {
        distributions,
        summary,
        seed,
        workers: 1,
    })
}
