use std::fs;
use std::path::Path;

use hep_core::errors::{ErrorInfo, HepError};
use hep_core::serde::to_canonical_json_bytes;
use hep_core::stable_hash_string;
use serde::{Deserialize, Serialize};

use crate::composition::CompositionCheck;
use crate::entries::EntryCheck;
use crate::fit::{FitModel, FitResult};
use crate::resonance::ResonanceCheck;

/// Result of attempting one fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitOutcome {
    /// The fit converged.
    Resolved(FitResult),
    /// The fit could not be performed; the reason is kept.
    Unresolved(ErrorInfo),
}

/// One fit attempt as it appears in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRecord {
    /// Distribution the fit was applied to.
    pub label: String,
    /// Model requested.
    pub model: FitModel,
    /// Fit range `[low, high)`.
    pub range: [f64; 2],
    /// Fit result or the reason it is missing.
    pub outcome: FitOutcome,
    /// Resolved with a reduced chi-square within tolerance.
    pub pass: bool,
}

impl FitRecord {
    /// Wraps a fit attempt. Degenerate fits become [`FitOutcome::Unresolved`];
    /// any other error is propagated.
    pub fn from_attempt(
        label: &str,
        model: FitModel,
        range: [f64; 2],
        attempt: Result<FitResult, HepError>,
        max_reduced_chi2: f64,
    ) -> Result<Self, HepError> {
        let (outcome, pass) = match attempt {
            Ok(result) => {
                let pass = result.reduced_chi2 <= max_reduced_chi2;
                (FitOutcome::Resolved(result), pass)
            }
            Err(HepError::FitDegenerate(info)) => (FitOutcome::Unresolved(info), false),
            Err(err) => return Err(err),
        };
        Ok(Self {
            label: label.to_string(),
            model,
            range,
            outcome,
            pass,
        })
    }

    /// The resolved result, if any.
    pub fn result(&self) -> Option<&FitResult> {
        match &self.outcome {
            FitOutcome::Resolved(result) => Some(result),
            FitOutcome::Unresolved(_) => None,
        }
    }

    /// The issue recorded in the report when the record does not pass.
    pub fn issue(&self) -> Option<HepError> {
        match &self.outcome {
            FitOutcome::Unresolved(info) => Some(HepError::FitDegenerate(info.clone())),
            FitOutcome::Resolved(result) if !self.pass => Some(HepError::ValidationMismatch(
                ErrorInfo::new("fit-quality", "reduced chi-square above tolerance")
                    .with_context("distribution", self.label.clone())
                    .with_context("reduced_chi2", format!("{:.3}", result.reduced_chi2)),
            )),
            FitOutcome::Resolved(_) => None,
        }
    }
}

/// Aggregated outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Content hash over every other field.
    pub analysis_hash: String,
    /// Hash of the generator configuration the dataset was produced with.
    pub config_hash: String,
    /// Entry count checks, by distribution name.
    pub entries: Vec<EntryCheck>,
    /// Species share checks.
    pub composition: Vec<CompositionCheck>,
    /// Fit plan results.
    pub fits: Vec<FitRecord>,
    /// Resonance extraction, when requested by the policy.
    pub resonance: Option<ResonanceCheck>,
    /// Non-fatal problems collected while validating.
    pub issues: Vec<ErrorInfo>,
}

impl ValidationReport {
    /// Assembles a report and computes its hash.
    pub fn new(
        config_hash: String,
        entries: Vec<EntryCheck>,
        composition: Vec<CompositionCheck>,
        fits: Vec<FitRecord>,
        resonance: Option<ResonanceCheck>,
        issues: Vec<ErrorInfo>,
    ) -> Result<Self, HepError> {
        let content = (&config_hash, &entries, &composition, &fits, &resonance, &issues);
        let analysis_hash = stable_hash_string(&content)?;
        Ok(Self {
            analysis_hash,
            config_hash,
            entries,
            composition,
            fits,
            resonance,
            issues,
        })
    }

    /// Whether every check passed and nothing was left unresolved.
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }

    /// Canonical JSON encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, HepError> {
        to_canonical_json_bytes(self)
    }

    /// Writes the canonical JSON encoding to `path`.
    pub fn save(&self, path: &Path) -> Result<(), HepError> {
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                HepError::Serde(
                    ErrorInfo::new("report-mkdir", err.to_string())
                        .with_context("path", parent.display().to_string()),
                )
            })?;
        }
        fs::write(path, self.to_bytes()?).map_err(|err| {
            HepError::Serde(
                ErrorInfo::new("report-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}
