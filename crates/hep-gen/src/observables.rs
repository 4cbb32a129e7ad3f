//! Names of the filled distributions and their default binning.

use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};

use hep_hist::DistributionSpec;

/// Registry index of every sampled species.
pub const SPECIES: &str = "species";
/// Polar angle of sampled particles.
pub const ZENITH: &str = "zenith";
/// Azimuthal angle of sampled particles.
pub const AZIMUTH: &str = "azimuth";
/// Momentum magnitude of sampled particles.
pub const PULSE: &str = "pulse";
/// Momentum component transverse to the beam axis.
pub const TRANSVERSE_PULSE: &str = "transverse-pulse";
/// Total energy of sampled particles.
pub const ENERGY: &str = "energy";
/// Invariant mass of every final-state pair.
pub const INV_MASS: &str = "inv-mass";
/// Pairs with opposite charges.
pub const INV_MASS_DISCORDANT: &str = "inv-mass-discordant";
/// Pairs with equal-sign charges.
pub const INV_MASS_CONCORDANT: &str = "inv-mass-concordant";
/// Pion/kaon pairs with opposite charges.
pub const INV_MASS_DISCORDANT_PK: &str = "inv-mass-discordant-pk";
/// Pion/kaon pairs with equal-sign charges.
pub const INV_MASS_CONCORDANT_PK: &str = "inv-mass-concordant-pk";
/// Daughters of the same resonance decay.
pub const INV_MASS_SIBLINGS: &str = "inv-mass-siblings";

/// Distributions filled once per sampled particle.
pub const SINGLE_PARTICLE: [&str; 6] = [SPECIES, ZENITH, AZIMUTH, PULSE, TRANSVERSE_PULSE, ENERGY];

/// Distributions filled once per classified pair.
pub const PAIRWISE: [&str; 5] = [
    INV_MASS,
    INV_MASS_DISCORDANT,
    INV_MASS_CONCORDANT,
    INV_MASS_DISCORDANT_PK,
    INV_MASS_CONCORDANT_PK,
];

/// Every distribution the generator fills.
pub fn required() -> impl Iterator<Item = &'static str> {
    SINGLE_PARTICLE
        .into_iter()
        .chain(PAIRWISE)
        .chain(std::iter::once(INV_MASS_SIBLINGS))
}

/// Default domains and binning.
///
/// The charge-class spectra use 10 MeV bins below 4 GeV so that a 50 MeV wide
/// resonance spans several bins in the difference spectra.
pub fn default_specs() -> BTreeMap<String, DistributionSpec> {
    let entries = [
        (SPECIES, DistributionSpec::new(0.0, 10.0, 10)),
        (ZENITH, DistributionSpec::new(0.0, PI, 180)),
        (AZIMUTH, DistributionSpec::new(0.0, TAU, 360)),
        (PULSE, DistributionSpec::new(0.0, 11.0, 110)),
        (TRANSVERSE_PULSE, DistributionSpec::new(0.0, 10.0, 100)),
        (ENERGY, DistributionSpec::new(0.0, 10.0, 100)),
        (INV_MASS, DistributionSpec::new(0.0, 10.0, 500).with_sumw2()),
        (INV_MASS_DISCORDANT, DistributionSpec::new(0.0, 4.0, 400).with_sumw2()),
        (INV_MASS_CONCORDANT, DistributionSpec::new(0.0, 4.0, 400).with_sumw2()),
        (INV_MASS_DISCORDANT_PK, DistributionSpec::new(0.0, 4.0, 400).with_sumw2()),
        (INV_MASS_CONCORDANT_PK, DistributionSpec::new(0.0, 4.0, 400).with_sumw2()),
        (INV_MASS_SIBLINGS, DistributionSpec::new(0.0, 2.0, 400).with_sumw2()),
    ];
    entries
        .into_iter()
        .map(|(name, spec)| (name.to_string(), spec))
        .collect()
}
