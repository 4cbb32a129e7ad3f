//! Theoretical entry counts derived from a generator configuration.

use std::collections::BTreeMap;

use hep_core::HepError;
use hep_gen::observables::*;
use hep_gen::{ChargeClass, GeneratorConfig, PairClassifier, SpeciesTable};
use hep_kin::{ParticleRegistry, TypeIndex};
use serde::{Deserialize, Serialize};

/// Share of pairs landing in each charge-class distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PairFractions {
    /// Opposite-charge pairs.
    pub discordant: f64,
    /// Same-sign pairs.
    pub concordant: f64,
    /// Opposite-charge pion/kaon pairs.
    pub discordant_pk: f64,
    /// Same-sign pion/kaon pairs.
    pub concordant_pk: f64,
}

impl PairFractions {
    fn add(&mut self, weight: f64, class: ChargeClass, pion_kaon: bool) {
        match class {
            ChargeClass::Discordant => {
                self.discordant += weight;
                if pion_kaon {
                    self.discordant_pk += weight;
                }
            }
            ChargeClass::Concordant => {
                self.concordant += weight;
                if pion_kaon {
                    self.concordant_pk += weight;
                }
            }
            ChargeClass::Neutral => {}
        }
    }
}

/// Expected per-run counts for every generated distribution.
///
/// Pairs of particles from different draws are treated as independent, each
/// member distributed according to the final-state species fractions
/// (resonance daughters included). Pairs of decay siblings are counted
/// separately through their channel content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expectations {
    /// Number of generated events.
    pub events: f64,
    /// Nominal final-state multiplicity per event.
    pub particles_per_event: f64,
    /// Species draws needed to reach that multiplicity.
    pub draws_per_event: f64,
    /// Unordered pairs per event.
    pub pairs_per_event: f64,
    /// Probability that a draw is a decaying resonance.
    pub resonance_probability: f64,
    /// Final-state fraction of each species, keyed by name.
    pub final_state: BTreeMap<String, f64>,
    /// Classification shares of pairs from different draws.
    pub independent_pairs: PairFractions,
    /// Classification shares of decay-sibling pairs.
    pub sibling_pairs: PairFractions,
}

impl Expectations {
    /// Derives expectations for a configuration resolved against `registry`.
    pub fn derive(config: &GeneratorConfig, registry: &ParticleRegistry) -> Result<Self, HepError> {
        let table = SpeciesTable::new(registry, &config.species)?;
        let classifier = PairClassifier::new(registry, &config.pion_species, &config.kaon_species)?;

        // Expected final-state yield of each species per draw.
        let mut yields: BTreeMap<TypeIndex, f64> = BTreeMap::new();
        let mut sibling_pairs = PairFractions::default();
        let mut resonance_probability = 0.0;
        for &(index, probability) in table.entries() {
            let name = registry.get(index)?.name();
            match config.decay_channels.get(name).filter(|list| !list.is_empty()) {
                Some(channels) => {
                    resonance_probability += probability;
                    let share = probability / channels.len() as f64;
                    for channel in channels {
                        let first = registry.find_type(&channel.first)?;
                        let second = registry.find_type(&channel.second)?;
                        *yields.entry(first).or_default() += share;
                        *yields.entry(second).or_default() += share;
                        let class = ChargeClass::of(
                            registry.get(first)?.charge(),
                            registry.get(second)?.charge(),
                        );
                        sibling_pairs.add(share, class, classifier.is_pion_kaon(first, second));
                    }
                }
                None => *yields.entry(index).or_default() += probability,
            }
        }
        if resonance_probability > 0.0 {
            sibling_pairs.discordant /= resonance_probability;
            sibling_pairs.concordant /= resonance_probability;
            sibling_pairs.discordant_pk /= resonance_probability;
            sibling_pairs.concordant_pk /= resonance_probability;
        }

        let per_draw: f64 = yields.values().sum();
        let fractions: Vec<(TypeIndex, f64)> = yields
            .iter()
            .map(|(&index, &count)| (index, count / per_draw))
            .collect();

        let mut independent_pairs = PairFractions::default();
        for &(a, fa) in &fractions {
            for &(b, fb) in &fractions {
                let class = ChargeClass::of(registry.get(a)?.charge(), registry.get(b)?.charge());
                independent_pairs.add(fa * fb, class, classifier.is_pion_kaon(a, b));
            }
        }

        let mut final_state = BTreeMap::new();
        for &(index, fraction) in &fractions {
            final_state.insert(registry.get(index)?.name().to_string(), fraction);
        }

        let n = config.boundary.effective_particles(config.particles_per_event) as f64;
        Ok(Self {
            events: config.events as f64,
            particles_per_event: n,
            draws_per_event: n / per_draw,
            pairs_per_event: n * (n - 1.0) / 2.0,
            resonance_probability,
            final_state,
            independent_pairs,
            sibling_pairs,
        })
    }

    /// Expected sibling pairs per event.
    pub fn siblings_per_event(&self) -> f64 {
        self.draws_per_event * self.resonance_probability
    }

    fn pair_count(&self, select: impl Fn(&PairFractions) -> f64) -> f64 {
        let siblings = self.siblings_per_event();
        let independent = self.pairs_per_event - siblings;
        let per_event = independent * select(&self.independent_pairs)
            + siblings * select(&self.sibling_pairs);
        self.events * per_event
    }

    /// Expected entry count of every generated distribution.
    pub fn entries(&self) -> BTreeMap<&'static str, f64> {
        let draws = self.events * self.draws_per_event;
        let mut expected = BTreeMap::new();
        for name in SINGLE_PARTICLE {
            expected.insert(name, draws);
        }
        expected.insert(INV_MASS, self.events * self.pairs_per_event);
        expected.insert(INV_MASS_DISCORDANT, self.pair_count(|f| f.discordant));
        expected.insert(INV_MASS_CONCORDANT, self.pair_count(|f| f.concordant));
        expected.insert(INV_MASS_DISCORDANT_PK, self.pair_count(|f| f.discordant_pk));
        expected.insert(INV_MASS_CONCORDANT_PK, self.pair_count(|f| f.concordant_pk));
        expected.insert(INV_MASS_SIBLINGS, self.events * self.siblings_per_event());
        expected
    }
}
