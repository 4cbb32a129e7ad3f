use hep_core::errors::{ErrorInfo, HepError};
use serde::{Deserialize, Serialize};

fn default_bins() -> usize {
    100
}

/// Domain and binning requested for a named distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionSpec {
    /// Inclusive lower edge of the domain.
    pub min: f64,
    /// Exclusive upper edge of the domain.
    pub max: f64,
    /// Number of equal-width bins.
    #[serde(default = "default_bins")]
    pub bins: usize,
    /// Track per-bin sum of squared weights for error propagation.
    #[serde(default)]
    pub sumw2: bool,
}

impl DistributionSpec {
    /// Creates a spec without squared-weight tracking.
    pub const fn new(min: f64, max: f64, bins: usize) -> Self {
        Self {
            min,
            max,
            bins,
            sumw2: false,
        }
    }

    /// Enables squared-weight tracking.
    pub const fn with_sumw2(mut self) -> Self {
        self.sumw2 = true;
        self
    }
}

/// Equal-width binned counter over `[min, max)`.
///
/// Every call to [`Distribution::fill`] increments the entry counter, including
/// values that land in the underflow or overflow slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredDistribution")]
pub struct Distribution {
    name: String,
    min: f64,
    max: f64,
    contents: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sum_w2: Option<Vec<f64>>,
    entries: u64,
    underflow: f64,
    overflow: f64,
}

/// Persisted form, checked against the binning invariants before use.
#[derive(Deserialize)]
struct StoredDistribution {
    name: String,
    min: f64,
    max: f64,
    contents: Vec<f64>,
    #[serde(default)]
    sum_w2: Option<Vec<f64>>,
    entries: u64,
    underflow: f64,
    overflow: f64,
}

impl TryFrom<StoredDistribution> for Distribution {
    type Error = HepError;

    fn try_from(stored: StoredDistribution) -> Result<Self, Self::Error> {
        check_binning(&stored.name, stored.min, stored.max, stored.contents.len())?;
        if let Some(sum_w2) = &stored.sum_w2 {
            if sum_w2.len() != stored.contents.len() {
                return Err(HepError::Config(
                    ErrorInfo::new("sum-w2-length", "squared weights do not match the bin count")
                        .with_context("distribution", stored.name)
                        .with_context("bins", stored.contents.len().to_string())
                        .with_context("sum_w2", sum_w2.len().to_string()),
                ));
            }
        }
        Ok(Self {
            name: stored.name,
            min: stored.min,
            max: stored.max,
            contents: stored.contents,
            sum_w2: stored.sum_w2,
            entries: stored.entries,
            underflow: stored.underflow,
            overflow: stored.overflow,
        })
    }
}

fn check_binning(name: &str, min: f64, max: f64, bins: usize) -> Result<(), HepError> {
    if bins == 0 {
        return Err(HepError::Config(
            ErrorInfo::new("zero-bins", "bin count must be positive")
                .with_context("distribution", name),
        ));
    }
    if !min.is_finite() || !max.is_finite() || min >= max {
        return Err(HepError::Config(
            ErrorInfo::new("invalid-domain", "domain must be finite with min < max")
                .with_context("distribution", name)
                .with_context("min", min.to_string())
                .with_context("max", max.to_string()),
        ));
    }
    Ok(())
}

impl Distribution {
    /// Creates an empty distribution after validating the domain.
    pub fn new(
        name: impl Into<String>,
        min: f64,
        max: f64,
        bins: usize,
    ) -> Result<Self, HepError> {
        let name = name.into();
        check_binning(&name, min, max, bins)?;
        Ok(Self {
            name,
            min,
            max,
            contents: vec![0.0; bins],
            sum_w2: None,
            entries: 0,
            underflow: 0.0,
            overflow: 0.0,
        })
    }

    /// Creates an empty distribution from a spec.
    pub fn from_spec(name: impl Into<String>, spec: &DistributionSpec) -> Result<Self, HepError> {
        let mut dist = Self::new(name, spec.min, spec.max, spec.bins)?;
        if spec.sumw2 {
            dist.enable_sum_w2();
        }
        Ok(dist)
    }

    /// Starts tracking squared weights, seeding them from the current contents.
    pub fn enable_sum_w2(&mut self) {
        if self.sum_w2.is_none() {
            self.sum_w2 = Some(self.contents.iter().map(|c| c.abs()).collect());
        }
    }

    /// Distribution name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the distribution.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Lower edge of the domain.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper edge of the domain.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Number of bins.
    pub fn bins(&self) -> usize {
        self.contents.len()
    }

    /// Number of fill calls.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Per-bin contents.
    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    /// Weight accumulated below `min`.
    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    /// Weight accumulated at or above `max`.
    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    /// Whether squared weights are tracked.
    pub fn tracks_sum_w2(&self) -> bool {
        self.sum_w2.is_some()
    }

    /// Width shared by all bins.
    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.contents.len() as f64
    }

    /// Center of bin `index`.
    pub fn bin_center(&self, index: usize) -> f64 {
        self.min + (index as f64 + 0.5) * self.bin_width()
    }

    /// Lower edge of bin `index`.
    pub fn bin_low_edge(&self, index: usize) -> f64 {
        self.min + index as f64 * self.bin_width()
    }

    /// Bin index holding `value`, or `None` outside the domain.
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        if !(value >= self.min && value < self.max) {
            return None;
        }
        let index = ((value - self.min) / self.bin_width()).floor() as usize;
        // Rounding can push values just below `max` onto the upper edge.
        Some(index.min(self.contents.len() - 1))
    }

    /// Adds one unit-weight observation.
    pub fn fill(&mut self, value: f64) {
        self.fill_weighted(value, 1.0);
    }

    /// Adds one observation with the given weight.
    pub fn fill_weighted(&mut self, value: f64, weight: f64) {
        self.entries += 1;
        match self.find_bin(value) {
            Some(index) => {
                self.contents[index] += weight;
                if let Some(sum_w2) = self.sum_w2.as_mut() {
                    sum_w2[index] += weight * weight;
                }
            }
            None if value < self.min => self.underflow += weight,
            None => self.overflow += weight,
        }
    }

    /// Content of bin `index` (zero outside the bin range).
    pub fn bin_content(&self, index: usize) -> f64 {
        self.contents.get(index).copied().unwrap_or(0.0)
    }

    /// Sum of squared weights of bin `index`, when tracked.
    pub fn sum_w2(&self, index: usize) -> Option<f64> {
        self.sum_w2
            .as_ref()
            .map(|sum_w2| sum_w2.get(index).copied().unwrap_or(0.0))
    }

    /// Statistical error of bin `index`.
    pub fn bin_error(&self, index: usize) -> f64 {
        match self.sum_w2(index) {
            Some(w2) => w2.sqrt(),
            None => self.bin_content(index).abs().sqrt(),
        }
    }

    /// Sum of in-range bin contents.
    pub fn integral(&self) -> f64 {
        self.contents.iter().sum()
    }

    fn check_layout(&self, other: &Distribution) -> Result<(), HepError> {
        if self.contents.len() != other.contents.len()
            || self.min != other.min
            || self.max != other.max
        {
            return Err(HepError::Config(
                ErrorInfo::new("layout-mismatch", "distributions have different binning")
                    .with_context("left", self.name.clone())
                    .with_context("right", other.name.clone()),
            ));
        }
        Ok(())
    }

    /// Adds `factor * other` bin by bin; squared weights combine as `factor²`.
    pub fn add_scaled(&mut self, other: &Distribution, factor: f64) -> Result<(), HepError> {
        self.check_layout(other)?;
        if other.sum_w2.is_some() {
            self.enable_sum_w2();
        }
        for index in 0..self.contents.len() {
            self.contents[index] += factor * other.contents[index];
        }
        if let Some(sum_w2) = self.sum_w2.as_mut() {
            for (index, slot) in sum_w2.iter_mut().enumerate() {
                let other_w2 = other
                    .sum_w2(index)
                    .unwrap_or_else(|| other.contents[index].abs());
                *slot += factor * factor * other_w2;
            }
        }
        self.underflow += factor * other.underflow;
        self.overflow += factor * other.overflow;
        self.entries += other.entries;
        Ok(())
    }

    /// Per-bin summation of an identically binned distribution.
    pub fn merge(&mut self, other: &Distribution) -> Result<(), HepError> {
        self.add_scaled(other, 1.0)
    }

    /// Chi-square shape compatibility of two unweighted distributions.
    ///
    /// Returns `(chi2, ndf)` computed over bins populated in either input, or
    /// `None` when one side is empty or fewer than two bins are populated.
    pub fn chi2_compatibility(
        &self,
        other: &Distribution,
    ) -> Result<Option<(f64, usize)>, HepError> {
        self.check_layout(other)?;
        let n1 = self.integral();
        let n2 = other.integral();
        if n1 <= 0.0 || n2 <= 0.0 {
            return Ok(None);
        }
        let mut chi2 = 0.0;
        let mut populated = 0usize;
        for (a, b) in self.contents.iter().zip(other.contents.iter()) {
            let sum = a + b;
            if sum <= 0.0 {
                continue;
            }
            populated += 1;
            let delta = n2 * a - n1 * b;
            chi2 += delta * delta / (n1 * n2 * sum);
        }
        if populated < 2 {
            return Ok(None);
        }
        Ok(Some((chi2, populated - 1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_routes_out_of_range_values() {
        let mut dist = Distribution::new("pulse", 0.0, 10.0, 10).unwrap();
        dist.fill(-1.0);
        dist.fill(0.0);
        dist.fill(9.999);
        dist.fill(10.0);
        dist.fill(f64::NAN);

        assert_eq!(dist.entries(), 5);
        assert_eq!(dist.bin_content(0), 1.0);
        assert_eq!(dist.bin_content(9), 1.0);
        assert_eq!(dist.underflow(), 1.0);
        assert_eq!(dist.overflow(), 2.0);
        assert_eq!(dist.integral(), 2.0);
    }

    #[test]
    fn rejects_degenerate_domains() {
        assert!(Distribution::new("a", 1.0, 1.0, 4).is_err());
        assert!(Distribution::new("a", 0.0, 1.0, 0).is_err());
        let err = Distribution::new("a", 0.0, f64::INFINITY, 4).unwrap_err();
        assert_eq!(err.info().code, "invalid-domain");
    }

    #[test]
    fn difference_propagates_squared_weights() {
        let spec = DistributionSpec::new(0.0, 4.0, 4).with_sumw2();
        let mut a = Distribution::from_spec("a", &spec).unwrap();
        let mut b = Distribution::from_spec("b", &spec).unwrap();
        for _ in 0..9 {
            a.fill(1.5);
        }
        for _ in 0..4 {
            b.fill(1.5);
        }
        a.add_scaled(&b, -1.0).unwrap();
        assert_eq!(a.bin_content(1), 5.0);
        assert_eq!(a.sum_w2(1), Some(13.0));
        assert!((a.bin_error(1) - 13f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn bin_geometry() {
        let dist = Distribution::new("zenith", 0.0, 2.0, 8).unwrap();
        assert_eq!(dist.bin_width(), 0.25);
        assert_eq!(dist.bin_center(0), 0.125);
        assert_eq!(dist.bin_low_edge(4), 1.0);
        assert_eq!(dist.find_bin(1.0), Some(4));
    }

    #[test]
    fn identical_shapes_are_compatible() {
        let mut a = Distribution::new("a", 0.0, 3.0, 3).unwrap();
        let mut b = Distribution::new("b", 0.0, 3.0, 3).unwrap();
        for (value, times) in [(0.5, 10), (1.5, 20), (2.5, 30)] {
            for _ in 0..times {
                a.fill(value);
                b.fill(value);
                b.fill(value);
            }
        }
        let (chi2, ndf) = a.chi2_compatibility(&b).unwrap().unwrap();
        assert!(chi2.abs() < 1e-12);
        assert_eq!(ndf, 2);
    }
}
