use hep_core::errors::{ErrorInfo, HepError};
use hep_kin::{ParticleRegistry, TypeIndex};
use rand::Rng;

use crate::config::SpeciesWeight;

const PROBABILITY_TOLERANCE: f64 = 1e-9;

fn table_error(message: &str) -> ErrorInfo {
    ErrorInfo::new("species-table", message)
}

/// Categorical sampler over registered species using cumulative thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesTable {
    entries: Vec<(TypeIndex, f64)>,
    thresholds: Vec<f64>,
}

impl SpeciesTable {
    /// Resolves every row against the registry and builds cumulative thresholds.
    pub fn new(registry: &ParticleRegistry, rows: &[SpeciesWeight]) -> Result<Self, HepError> {
        if rows.is_empty() {
            return Err(HepError::InvalidDescriptor(table_error(
                "species table must not be empty",
            )));
        }
        let mut entries = Vec::with_capacity(rows.len());
        let mut thresholds = Vec::with_capacity(rows.len());
        let mut cumulative = 0.0;
        for row in rows {
            if !row.probability.is_finite() || row.probability < 0.0 {
                return Err(HepError::InvalidDescriptor(
                    table_error("probabilities must be finite and non-negative")
                        .with_context("species", row.name.as_str())
                        .with_context("probability", row.probability.to_string()),
                ));
            }
            let index = registry.find_type(&row.name)?;
            cumulative += row.probability;
            entries.push((index, row.probability));
            thresholds.push(cumulative);
        }
        if (cumulative - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(HepError::InvalidDescriptor(
                table_error("probabilities must sum to one")
                    .with_context("sum", cumulative.to_string()),
            ));
        }
        Ok(Self {
            entries,
            thresholds,
        })
    }

    /// Draws one species from a single uniform deviate.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TypeIndex {
        let u: f64 = rng.gen();
        let slot = self.thresholds.partition_point(|&threshold| threshold <= u);
        // Rounding in the cumulative sum can leave u above the last threshold.
        let slot = slot.min(self.entries.len() - 1);
        self.entries[slot].0
    }

    /// Resolved `(species, probability)` rows in configuration order.
    pub fn entries(&self) -> &[(TypeIndex, f64)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::standard_registry;
    use crate::config::GeneratorConfig;
    use hep_core::RngHandle;

    #[test]
    fn rejects_tables_that_do_not_sum_to_one() {
        let registry = standard_registry().unwrap();
        let mut rows = GeneratorConfig::default().species;
        rows[0].probability = 0.5;
        let err = SpeciesTable::new(&registry, &rows).unwrap_err();
        assert!(matches!(err, HepError::InvalidDescriptor(_)));
        assert_eq!(err.info().code, "species-table");
    }

    #[test]
    fn unknown_species_is_fatal() {
        let registry = standard_registry().unwrap();
        let rows = vec![SpeciesWeight {
            name: "muon".into(),
            probability: 1.0,
        }];
        let err = SpeciesTable::new(&registry, &rows).unwrap_err();
        assert!(matches!(err, HepError::TypeNotFound(_)));
    }

    #[test]
    fn zero_probability_rows_are_never_drawn() {
        let registry = standard_registry().unwrap();
        let rows = vec![
            SpeciesWeight {
                name: "pion+".into(),
                probability: 0.0,
            },
            SpeciesWeight {
                name: "kaon+".into(),
                probability: 1.0,
            },
        ];
        let table = SpeciesTable::new(&registry, &rows).unwrap();
        let kaon = registry.find_type("kaon+").unwrap();
        let mut rng = RngHandle::from_seed(1);
        assert!((0..1000).all(|_| table.sample(&mut rng) == kaon));
    }
}
