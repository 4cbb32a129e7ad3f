use std::collections::BTreeSet;

use hep_core::HepError;
use hep_kin::{Particle, ParticleRegistry, TypeIndex};

/// Final-state particles of one event, in production order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    particles: Vec<Particle>,
}

impl Event {
    /// Empty event with room for `capacity` particles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
        }
    }

    /// Appends a final-state particle.
    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    /// Number of final-state particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Whether the event holds no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles in production order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Drops all particles, keeping the allocation.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Number of unordered pairs `C(n, 2)`.
    pub fn pair_count(&self) -> usize {
        let n = self.particles.len();
        n * n.saturating_sub(1) / 2
    }
}

/// Relative sign of the charges in a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeClass {
    /// Opposite charges.
    Discordant,
    /// Same-sign charges.
    Concordant,
    /// At least one neutral particle.
    Neutral,
}

impl ChargeClass {
    /// Classifies a pair by the product of its charges.
    pub fn of(charge_a: i32, charge_b: i32) -> Self {
        match (charge_a.signum() * charge_b.signum()).cmp(&0) {
            std::cmp::Ordering::Less => ChargeClass::Discordant,
            std::cmp::Ordering::Greater => ChargeClass::Concordant,
            std::cmp::Ordering::Equal => ChargeClass::Neutral,
        }
    }
}

/// Recognises pion/kaon pairs in either order.
#[derive(Debug, Clone, PartialEq)]
pub struct PairClassifier {
    pions: BTreeSet<TypeIndex>,
    kaons: BTreeSet<TypeIndex>,
}

impl PairClassifier {
    /// Resolves the configured pion and kaon species names.
    pub fn new(
        registry: &ParticleRegistry,
        pions: &[String],
        kaons: &[String],
    ) -> Result<Self, HepError> {
        let resolve = |names: &[String]| -> Result<BTreeSet<TypeIndex>, HepError> {
            names.iter().map(|name| registry.find_type(name)).collect()
        };
        Ok(Self {
            pions: resolve(pions)?,
            kaons: resolve(kaons)?,
        })
    }

    /// Whether one member of the pair is a pion and the other a kaon.
    pub fn is_pion_kaon(&self, a: TypeIndex, b: TypeIndex) -> bool {
        (self.pions.contains(&a) && self.kaons.contains(&b))
            || (self.kaons.contains(&a) && self.pions.contains(&b))
    }
}
