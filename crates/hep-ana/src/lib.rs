//! Validation of generated datasets: expected entry counts, species
//! composition, least-squares fits and resonance extraction.
#![deny(missing_docs)]

/// Analyzer state machine driving a validation pass.
pub mod analyzer;
/// Species share checks.
pub mod composition;
/// Entry count checks.
pub mod entries;
pub mod expect;
/// Weighted least-squares fits of binned distributions.
pub mod fit;
/// Tolerances and fit plan.
pub mod policy;
/// Report records and persistence.
pub mod report;
pub mod resonance;
/// Incomplete gamma and chi-square probability.
pub mod special;

pub use analyzer::{analyze, AnalyzerState, ValidationAnalyzer};
pub use composition::CompositionCheck;
pub use entries::EntryCheck;
pub use expect::Expectations;
pub use fit::{fit_distribution, FitModel, FitParameter, FitResult};
pub use policy::{FitSpec, ResonanceSpec, ValidationPolicy};
pub use report::{FitOutcome, FitRecord, ValidationReport};
pub use resonance::ResonanceCheck;
