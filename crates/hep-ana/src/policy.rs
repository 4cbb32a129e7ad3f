use std::f64::consts::{PI, TAU};
use std::fs;
use std::path::Path;

use hep_core::errors::{ErrorInfo, HepError};
use hep_core::serde::from_yaml_slice;
use hep_gen::catalog::K_STAR;
use hep_gen::observables::{AZIMUTH, INV_MASS_SIBLINGS, PULSE, ZENITH};
use serde::{Deserialize, Serialize};

use crate::fit::FitModel;

/// One entry of the fit plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSpec {
    /// Distribution to fit.
    pub distribution: String,
    /// Parametric model.
    pub model: FitModel,
    /// Fit range `[low, high)` in the distribution's units.
    pub range: [f64; 2],
}

impl FitSpec {
    fn new(distribution: &str, model: FitModel, low: f64, high: f64) -> Self {
        Self {
            distribution: distribution.to_string(),
            model,
            range: [low, high],
        }
    }
}

/// Resonance whose mass and width are extracted from the difference spectra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResonanceSpec {
    /// Registered resonance name.
    #[serde(default = "ResonanceSpec::default_species")]
    pub species: String,
    /// Half-width of the fit window in units of the nominal width.
    #[serde(default = "ResonanceSpec::default_window")]
    pub window: f64,
    /// Absolute tolerance on the averaged mass, GeV.
    #[serde(default = "ResonanceSpec::default_mass_tol")]
    pub mass_tol: f64,
    /// Absolute tolerance on the averaged width, GeV.
    #[serde(default = "ResonanceSpec::default_width_tol")]
    pub width_tol: f64,
}

impl ResonanceSpec {
    fn default_species() -> String {
        K_STAR.to_string()
    }

    const fn default_window() -> f64 {
        6.0
    }

    const fn default_mass_tol() -> f64 {
        0.01
    }

    const fn default_width_tol() -> f64 {
        0.02
    }
}

impl Default for ResonanceSpec {
    fn default() -> Self {
        Self {
            species: Self::default_species(),
            window: Self::default_window(),
            mass_tol: Self::default_mass_tol(),
            width_tol: Self::default_width_tol(),
        }
    }
}

/// Tolerances and fit plan applied by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    /// Relative tolerance on entry counts.
    #[serde(default = "ValidationPolicy::default_entry_rel_tol")]
    pub entry_rel_tol: f64,
    /// Absolute tolerance on species shares, in percentage points.
    #[serde(default = "ValidationPolicy::default_composition_tol_pp")]
    pub composition_tol_pp: f64,
    /// Largest reduced chi-square accepted for a resolved fit.
    #[serde(default = "ValidationPolicy::default_max_reduced_chi2")]
    pub max_reduced_chi2: f64,
    /// Fits performed on single distributions.
    #[serde(default = "ValidationPolicy::default_fits")]
    pub fits: Vec<FitSpec>,
    /// Resonance extraction settings; `None` skips the extraction.
    #[serde(default = "ValidationPolicy::default_resonance")]
    pub resonance: Option<ResonanceSpec>,
}

impl ValidationPolicy {
    const fn default_entry_rel_tol() -> f64 {
        0.05
    }

    const fn default_composition_tol_pp() -> f64 {
        0.5
    }

    const fn default_max_reduced_chi2() -> f64 {
        5.0
    }

    fn default_fits() -> Vec<FitSpec> {
        vec![
            FitSpec::new(ZENITH, FitModel::Constant, 0.0, PI),
            FitSpec::new(AZIMUTH, FitModel::Constant, 0.0, TAU),
            FitSpec::new(PULSE, FitModel::Exponential, 0.0, 7.0),
            FitSpec::new(INV_MASS_SIBLINGS, FitModel::Gaussian, 0.64, 1.14),
        ]
    }

    fn default_resonance() -> Option<ResonanceSpec> {
        Some(ResonanceSpec::default())
    }

    /// Loads a YAML policy file; omitted fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, HepError> {
        let bytes = fs::read(path).map_err(|err| {
            HepError::Config(
                ErrorInfo::new("policy-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        from_yaml_slice(&bytes).map_err(|err| {
            HepError::Config(err.info().clone().with_context("path", path.display().to_string()))
        })
    }

    /// Parses a YAML policy document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, HepError> {
        from_yaml_slice(contents.as_bytes())
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            entry_rel_tol: Self::default_entry_rel_tol(),
            composition_tol_pp: Self::default_composition_tol_pp(),
            max_reduced_chi2: Self::default_max_reduced_chi2(),
            fits: Self::default_fits(),
            resonance: Self::default_resonance(),
        }
    }
}
