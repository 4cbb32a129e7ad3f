use std::collections::BTreeMap;

use hep_core::errors::{ErrorInfo, HepError};
use serde::{Deserialize, Serialize};

use crate::distribution::{Distribution, DistributionSpec};

fn unknown_distribution(name: &str) -> HepError {
    HepError::Config(
        ErrorInfo::new("unknown-distribution", "no distribution registered under this name")
            .with_context("distribution", name),
    )
}

/// Write side used by the event generator.
pub trait DistributionSink {
    /// Records one observation into the named distribution.
    fn fill(&mut self, name: &str, value: f64) -> Result<(), HepError>;
}

/// Read side used by the validation analyzer.
pub trait DistributionSource {
    /// Returns the named distribution.
    fn distribution(&self, name: &str) -> Result<&Distribution, HepError>;

    /// Number of fill calls recorded by the named distribution.
    fn entries(&self, name: &str) -> Result<u64, HepError> {
        Ok(self.distribution(name)?.entries())
    }

    /// Content of bin `index` of the named distribution.
    fn bin_content(&self, name: &str, index: usize) -> Result<f64, HepError> {
        Ok(self.distribution(name)?.bin_content(index))
    }

    /// Sum of squared weights of bin `index`, when the distribution tracks them.
    fn sum_w2(&self, name: &str, index: usize) -> Result<Option<f64>, HepError> {
        Ok(self.distribution(name)?.sum_w2(index))
    }
}

/// Distributions keyed by name, iterated in name order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistogramSet {
    distributions: BTreeMap<String, Distribution>,
}

impl HistogramSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds empty distributions for every spec.
    pub fn from_specs(specs: &BTreeMap<String, DistributionSpec>) -> Result<Self, HepError> {
        let mut set = Self::new();
        for (name, spec) in specs {
            set.insert(Distribution::from_spec(name.clone(), spec)?);
        }
        Ok(set)
    }

    /// Inserts or replaces a distribution under its own name.
    pub fn insert(&mut self, distribution: Distribution) {
        self.distributions
            .insert(distribution.name().to_string(), distribution);
    }

    /// Looks up a distribution.
    pub fn get(&self, name: &str) -> Option<&Distribution> {
        self.distributions.get(name)
    }

    /// Looks up a distribution mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Distribution> {
        self.distributions.get_mut(name)
    }

    /// Whether a distribution is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.distributions.contains_key(name)
    }

    /// Number of distributions.
    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    /// Whether the set holds no distributions.
    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }

    /// Iterates over distributions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Distribution> {
        self.distributions.values()
    }

    /// Adds every distribution of `other` bin by bin.
    ///
    /// Both sets must hold the same names with identical binning; per-bin
    /// summation makes the merge independent of order.
    pub fn merge(&mut self, other: &HistogramSet) -> Result<(), HepError> {
        if self.distributions.len() != other.distributions.len()
            || self
                .distributions
                .keys()
                .zip(other.distributions.keys())
                .any(|(a, b)| a != b)
        {
            return Err(HepError::Config(
                ErrorInfo::new("layout-mismatch", "histogram sets hold different distributions")
                    .with_context("left", self.distributions.len().to_string())
                    .with_context("right", other.distributions.len().to_string()),
            ));
        }
        for (name, dist) in self.distributions.iter_mut() {
            let rhs = other.get(name).ok_or_else(|| unknown_distribution(name))?;
            dist.merge(rhs)?;
        }
        Ok(())
    }

    /// Returns `minuend − subtrahend` as a new distribution named `name`.
    pub fn difference(
        &self,
        minuend: &str,
        subtrahend: &str,
        name: &str,
    ) -> Result<Distribution, HepError> {
        let mut diff = self.distribution(minuend)?.clone();
        diff.set_name(name);
        diff.add_scaled(self.distribution(subtrahend)?, -1.0)?;
        Ok(diff)
    }
}

impl DistributionSink for HistogramSet {
    fn fill(&mut self, name: &str, value: f64) -> Result<(), HepError> {
        let dist = self
            .distributions
            .get_mut(name)
            .ok_or_else(|| unknown_distribution(name))?;
        dist.fill(value);
        Ok(())
    }
}

impl DistributionSource for HistogramSet {
    fn distribution(&self, name: &str) -> Result<&Distribution, HepError> {
        self.distributions
            .get(name)
            .ok_or_else(|| unknown_distribution(name))
    }
}
