//! Mass and width extraction from charge-class difference spectra.
//!
//! Uncorrelated pairs populate the discordant and concordant spectra alike, so
//! subtracting one from the other leaves the decay daughters' peak.

use hep_core::errors::{ErrorInfo, HepError};
use hep_core::hash::round_f64;
use hep_gen::observables::{
    INV_MASS_CONCORDANT, INV_MASS_CONCORDANT_PK, INV_MASS_DISCORDANT, INV_MASS_DISCORDANT_PK,
};
use hep_hist::{Distribution, HistogramSet};
use hep_kin::ParticleRegistry;
use serde::{Deserialize, Serialize};

use crate::fit::{fit_with_guess, FitModel};
use crate::policy::ResonanceSpec;
use crate::report::FitRecord;

/// Difference of all opposite-charge and same-sign pairs.
pub const DIFF_ALL: &str = "diff-inv-mass-discordant-concordant";
/// Difference restricted to pion/kaon pairs.
pub const DIFF_PION_KAON: &str = "diff-inv-mass-pk-discordant-concordant";

/// Averaged resonance parameters compared with the registry descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResonanceCheck {
    /// Resonance name.
    pub species: String,
    /// Registered mass, GeV.
    pub nominal_mass: f64,
    /// Registered width, GeV.
    pub nominal_width: f64,
    /// Gaussian fits of each difference spectrum.
    pub fits: Vec<FitRecord>,
    /// Mean of the resolved fitted means.
    pub mass: Option<f64>,
    /// Mean of the resolved fitted `|σ|`.
    pub width: Option<f64>,
    /// Both averages resolved and within tolerance.
    pub pass: bool,
}

impl ResonanceCheck {
    /// The mismatch recorded in the report when the check fails.
    pub fn mismatch(&self) -> Option<HepError> {
        if self.pass {
            return None;
        }
        let info = ErrorInfo::new("resonance", "extracted resonance parameters outside tolerance")
            .with_context("species", self.species.clone());
        let info = match (self.mass, self.width) {
            (Some(mass), Some(width)) => info
                .with_context("mass", format!("{mass:.5}"))
                .with_context("width", format!("{width:.5}")),
            _ => info.with_hint("no difference spectrum could be fitted"),
        };
        Some(HepError::ValidationMismatch(info))
    }
}

fn fit_difference(
    diff: &Distribution,
    mass: f64,
    width: f64,
    range: [f64; 2],
    max_reduced_chi2: f64,
) -> Result<FitRecord, HepError> {
    let peak = (0..diff.bins())
        .filter(|&bin| {
            let x = diff.bin_center(bin);
            x >= range[0] && x < range[1]
        })
        .map(|bin| diff.bin_content(bin))
        .fold(0.0_f64, f64::max);
    let guess = [peak, mass, width];
    let attempt = fit_with_guess(diff, FitModel::Gaussian, range, Some(&guess));
    FitRecord::from_attempt(diff.name(), FitModel::Gaussian, range, attempt, max_reduced_chi2)
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Fits both difference spectra and averages the resolved means and widths.
pub fn extract_resonance(
    set: &HistogramSet,
    registry: &ParticleRegistry,
    spec: &ResonanceSpec,
    max_reduced_chi2: f64,
) -> Result<ResonanceCheck, HepError> {
    let descriptor = registry.get(registry.find_type(&spec.species)?)?;
    let (mass, width) = (descriptor.mass(), descriptor.width());
    if width <= 0.0 {
        return Err(HepError::InvalidDescriptor(
            ErrorInfo::new("stable-resonance", "resonance extraction needs a species with a width")
                .with_context("species", spec.species.clone()),
        ));
    }
    let range = [mass - spec.window * width, mass + spec.window * width];

    let differences = [
        set.difference(INV_MASS_DISCORDANT, INV_MASS_CONCORDANT, DIFF_ALL)?,
        set.difference(INV_MASS_DISCORDANT_PK, INV_MASS_CONCORDANT_PK, DIFF_PION_KAON)?,
    ];
    let mut fits = Vec::with_capacity(differences.len());
    for diff in &differences {
        fits.push(fit_difference(diff, mass, width, range, max_reduced_chi2)?);
    }

    let (mut means, mut sigmas) = (Vec::new(), Vec::new());
    for result in fits.iter().filter_map(FitRecord::result) {
        if let (Some(mu), Some(sigma)) = (result.parameter("mean"), result.parameter("sigma")) {
            means.push(mu.value);
            sigmas.push(sigma.value.abs());
        }
    }
    let fitted_mass = mean(&means);
    let fitted_width = mean(&sigmas);
    let pass = match (fitted_mass, fitted_width) {
        (Some(m), Some(w)) => {
            (m - mass).abs() <= spec.mass_tol && (w - width).abs() <= spec.width_tol
        }
        _ => false,
    };
    tracing::info!(
        species = %spec.species,
        mass = ?fitted_mass,
        width = ?fitted_width,
        pass,
        "resonance extraction"
    );
    Ok(ResonanceCheck {
        species: spec.species.clone(),
        nominal_mass: mass,
        nominal_width: width,
        fits,
        mass: fitted_mass.map(round_f64),
        width: fitted_width.map(round_f64),
        pass,
    })
}
