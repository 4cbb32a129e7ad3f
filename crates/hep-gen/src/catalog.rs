//! Species used by the default generator configuration.

use hep_core::HepError;
use hep_kin::ParticleRegistry;

/// Positive pion.
pub const PION_PLUS: &str = "pion+";
/// Negative pion.
pub const PION_MINUS: &str = "pion-";
/// Positive kaon.
pub const KAON_PLUS: &str = "kaon+";
/// Negative kaon.
pub const KAON_MINUS: &str = "kaon-";
/// Proton.
pub const PROTON_PLUS: &str = "proton+";
/// Antiproton.
pub const PROTON_MINUS: &str = "proton-";
/// Neutral K*(892) resonance.
pub const K_STAR: &str = "k*";

/// `(name, mass [GeV], charge, width [GeV])` for every catalog entry, in registration order.
pub const STANDARD_SPECIES: [(&str, f64, i32, f64); 7] = [
    (PION_PLUS, 0.13957, 1, 0.0),
    (PION_MINUS, 0.13957, -1, 0.0),
    (KAON_PLUS, 0.49367, 1, 0.0),
    (KAON_MINUS, 0.49367, -1, 0.0),
    (PROTON_PLUS, 0.93827, 1, 0.0),
    (PROTON_MINUS, 0.93827, -1, 0.0),
    (K_STAR, 0.89166, 0, 0.05),
];

/// Registry holding the pion, kaon, proton and K* species.
pub fn standard_registry() -> Result<ParticleRegistry, HepError> {
    let mut registry = ParticleRegistry::new();
    for (name, mass, charge, width) in STANDARD_SPECIES {
        registry.add_type(name, mass, charge, width)?;
    }
    Ok(registry)
}
