#![deny(missing_docs)]
#![doc = "Particle species registry, special-relativistic kinematics and two-body decays."]

/// Relativistic energy, invariant mass, boosts and two-body decays.
pub mod kinematics;
/// Particle instances bound to registry entries.
pub mod particle;
/// Fixed-capacity registry of particle species.
pub mod registry;
/// Random samplers shared by the generator and the decay routine.
pub mod sampling;

pub use kinematics::{boost, invariant_mass, total_energy, two_body_decay, Momentum};
pub use particle::Particle;
pub use registry::{ParticleKind, ParticleRegistry, ParticleType, TypeIndex, DEFAULT_CAPACITY};
