//! Binned distribution aggregation: fill-by-name sinks, read-side sources,
//! per-bin merging and dataset persistence.
#![deny(missing_docs)]

/// Dataset files bundling distributions with their provenance.
pub mod dataset;
/// Single binned distribution.
pub mod distribution;
/// Named collections of distributions and the sink/source seams.
pub mod set;

pub use dataset::DatasetFile;
pub use distribution::{Distribution, DistributionSpec};
pub use set::{DistributionSink, DistributionSource, HistogramSet};
