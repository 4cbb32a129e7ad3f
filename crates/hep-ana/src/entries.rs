use hep_core::errors::{ErrorInfo, HepError};
use hep_core::hash::round_f64;
use hep_hist::DistributionSource;
use serde::{Deserialize, Serialize};

use crate::expect::Expectations;

/// Observed against expected entry count of one distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryCheck {
    /// Distribution name.
    pub label: String,
    /// Expected fill count.
    pub expected: f64,
    /// Recorded fill count.
    pub observed: u64,
    /// `|observed − expected| / expected`.
    pub relative_deviation: f64,
    /// Whether the deviation is within tolerance.
    pub pass: bool,
}

impl EntryCheck {
    /// The mismatch recorded in the report when the check fails.
    pub fn mismatch(&self) -> Option<HepError> {
        (!self.pass).then(|| {
            HepError::ValidationMismatch(
                ErrorInfo::new("entry-count", "entry count outside tolerance")
                    .with_context("distribution", self.label.clone())
                    .with_context("expected", format!("{:.1}", self.expected))
                    .with_context("observed", self.observed.to_string()),
            )
        })
    }
}

/// Relative deviation; expectations below one entry are compared absolutely.
fn relative_deviation(observed: f64, expected: f64) -> f64 {
    (observed - expected).abs() / expected.max(1.0)
}

/// Compares every expected entry count against `source`.
pub fn check_entries(
    source: &impl DistributionSource,
    expectations: &Expectations,
    rel_tol: f64,
) -> Result<Vec<EntryCheck>, HepError> {
    let mut checks = Vec::new();
    for (label, expected) in expectations.entries() {
        let observed = source.entries(label)?;
        let deviation = relative_deviation(observed as f64, expected);
        checks.push(EntryCheck {
            label: label.to_string(),
            expected: round_f64(expected),
            observed,
            relative_deviation: round_f64(deviation),
            pass: deviation <= rel_tol,
        });
    }
    Ok(checks)
}
