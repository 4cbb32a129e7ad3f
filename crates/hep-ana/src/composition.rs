use hep_core::errors::{ErrorInfo, HepError};
use hep_core::hash::round_f64;
use hep_gen::observables::SPECIES;
use hep_gen::{GeneratorConfig, SpeciesTable};
use hep_hist::DistributionSource;
use hep_kin::ParticleRegistry;
use serde::{Deserialize, Serialize};

/// Observed share of one sampled species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionCheck {
    /// Species name.
    pub species: String,
    /// Configured probability, in percent.
    pub expected_pct: f64,
    /// Share of `species` entries in this species' bin, in percent.
    pub observed_pct: f64,
    /// `observed_pct − expected_pct`, in percentage points.
    pub delta_pp: f64,
    /// Whether `|delta_pp|` is within tolerance.
    pub pass: bool,
}

impl CompositionCheck {
    /// The mismatch recorded in the report when the check fails.
    pub fn mismatch(&self) -> Option<HepError> {
        (!self.pass).then(|| {
            HepError::ValidationMismatch(
                ErrorInfo::new("composition", "species share outside tolerance")
                    .with_context("species", self.species.clone())
                    .with_context("delta_pp", format!("{:.3}", self.delta_pp)),
            )
        })
    }
}

/// Compares the `species` distribution against the configured table.
///
/// Each sampled species is filled at its registry index, so the bin holding
/// that index carries its count.
pub fn check_composition(
    source: &impl DistributionSource,
    config: &GeneratorConfig,
    registry: &ParticleRegistry,
    tol_pp: f64,
) -> Result<Vec<CompositionCheck>, HepError> {
    let table = SpeciesTable::new(registry, &config.species)?;
    let dist = source.distribution(SPECIES)?;
    let total = dist.entries() as f64;
    if total == 0.0 {
        return Err(HepError::ValidationMismatch(ErrorInfo::new(
            "empty-composition",
            "species distribution has no entries",
        )));
    }

    let mut checks = Vec::with_capacity(table.entries().len());
    for &(index, probability) in table.entries() {
        let name = registry.get(index)?.name().to_string();
        let count = dist
            .find_bin(index.as_raw() as f64)
            .map(|bin| dist.bin_content(bin))
            .unwrap_or(0.0);
        let expected_pct = probability * 100.0;
        let observed_pct = count / total * 100.0;
        let delta_pp = observed_pct - expected_pct;
        checks.push(CompositionCheck {
            species: name,
            expected_pct: round_f64(expected_pct),
            observed_pct: round_f64(observed_pct),
            delta_pp: round_f64(delta_pp),
            pass: delta_pp.abs() <= tol_pp,
        });
    }
    Ok(checks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hep_gen::observables::default_specs;
    use hep_gen::standard_registry;
    use hep_hist::{DistributionSink, HistogramSet};

    #[test]
    fn exact_shares_pass_and_skew_fails() {
        let registry = standard_registry().unwrap();
        let config = GeneratorConfig::default();
        let table = SpeciesTable::new(&registry, &config.species).unwrap();
        let mut set = HistogramSet::from_specs(&default_specs()).unwrap();
        for &(index, probability) in table.entries() {
            for _ in 0..(probability * 10_000.0).round() as usize {
                set.fill(SPECIES, index.as_raw() as f64).unwrap();
            }
        }
        let checks = check_composition(&set, &config, &registry, 0.5).unwrap();
        assert_eq!(checks.len(), table.entries().len());
        assert!(checks.iter().all(|check| check.pass));

        let pion = registry.find_type("pion+").unwrap();
        for _ in 0..500 {
            set.fill(SPECIES, pion.as_raw() as f64).unwrap();
        }
        let checks = check_composition(&set, &config, &registry, 0.5).unwrap();
        let skewed = checks.iter().find(|check| check.species == "pion+").unwrap();
        assert!(!skewed.pass);
        assert!(skewed.mismatch().is_some());
    }

    #[test]
    fn empty_species_distribution_is_a_mismatch() {
        let registry = standard_registry().unwrap();
        let set = HistogramSet::from_specs(&default_specs()).unwrap();
        let err = check_composition(&set, &GeneratorConfig::default(), &registry, 0.5).unwrap_err();
        assert_eq!(err.info().code, "empty-composition");
    }
}
