use hep_core::errors::{ErrorInfo, HepError};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::kinematics::{self, Momentum};
use crate::registry::{ParticleRegistry, ParticleType, TypeIndex};

/// Particle produced in an event: a species index plus a lab-frame momentum.
///
/// Species data lives in the [`ParticleRegistry`]; every accessor that needs
/// mass or charge takes the registry explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    index: TypeIndex,
    momentum: Momentum,
}

impl Particle {
    /// Creates a particle from an already resolved species index.
    pub fn new(index: TypeIndex, momentum: Momentum) -> Self {
        Self { index, momentum }
    }

    /// Creates a particle by species name.
    pub fn named(
        registry: &ParticleRegistry,
        name: &str,
        momentum: Momentum,
    ) -> Result<Self, HepError> {
        Ok(Self::new(registry.find_type(name)?, momentum))
    }

    /// Species index.
    pub fn type_index(&self) -> TypeIndex {
        self.index
    }

    /// Switches to another species after checking it exists.
    pub fn set_type(
        &mut self,
        registry: &ParticleRegistry,
        index: TypeIndex,
    ) -> Result<(), HepError> {
        registry.get(index)?;
        self.index = index;
        Ok(())
    }

    /// Lab-frame momentum.
    pub fn momentum(&self) -> &Momentum {
        &self.momentum
    }

    /// Replaces the momentum.
    pub fn set_momentum(&mut self, momentum: Momentum) {
        self.momentum = momentum;
    }

    /// Species descriptor.
    pub fn species<'r>(
        &self,
        registry: &'r ParticleRegistry,
    ) -> Result<&'r ParticleType, HepError> {
        registry.get(self.index)
    }

    /// Rest mass.
    pub fn mass(&self, registry: &ParticleRegistry) -> Result<f64, HepError> {
        Ok(self.species(registry)?.mass())
    }

    /// Electric charge.
    pub fn charge(&self, registry: &ParticleRegistry) -> Result<i32, HepError> {
        Ok(self.species(registry)?.charge())
    }

    /// Total energy.
    pub fn energy(&self, registry: &ParticleRegistry) -> Result<f64, HepError> {
        Ok(kinematics::total_energy(self.mass(registry)?, &self.momentum))
    }

    /// Momentum component transverse to the beam axis.
    pub fn transverse_momentum(&self) -> f64 {
        self.momentum.x.hypot(self.momentum.y)
    }

    /// Invariant mass of the pair formed with `other`.
    pub fn invariant_mass(
        &self,
        other: &Particle,
        registry: &ParticleRegistry,
    ) -> Result<f64, HepError> {
        Ok(kinematics::invariant_mass(
            self.mass(registry)?,
            &self.momentum,
            other.mass(registry)?,
            &other.momentum,
        ))
    }

    /// Decays this resonance into species `first` and `second`.
    pub fn decay<R: Rng + ?Sized>(
        &self,
        registry: &ParticleRegistry,
        first: TypeIndex,
        second: TypeIndex,
        rng: &mut R,
    ) -> Result<(Particle, Particle), HepError> {
        let parent = self.species(registry)?;
        if !parent.is_resonance() {
            return Err(HepError::KinematicallyForbidden(
                ErrorInfo::new("stable-parent", "only resonances can decay")
                    .with_context("species", parent.name()),
            ));
        }
        let mass_1 = registry.get(first)?.mass();
        let mass_2 = registry.get(second)?.mass();
        let (p1, p2) = kinematics::two_body_decay(
            parent.mass(),
            &self.momentum,
            mass_1,
            mass_2,
            parent.width(),
            rng,
        )
        .map_err(|err| match err {
            HepError::KinematicallyForbidden(info) => {
                HepError::KinematicallyForbidden(info.with_context("species", parent.name()))
            }
            other => other,
        })?;
        Ok((Particle::new(first, p1), Particle::new(second, p2)))
    }
}
