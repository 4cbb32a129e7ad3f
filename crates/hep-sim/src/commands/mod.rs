pub mod analyze;
pub mod generate;
pub mod output;
pub mod run;
pub mod types;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use hep_ana::ValidationPolicy;
use hep_gen::GeneratorConfig;

/// Generator options shared by `generate`, `analyze` and `run`.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// YAML generator configuration; built-in defaults when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Overrides the configured master seed.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Overrides the configured worker count.
    #[arg(long)]
    pub workers: Option<usize>,
    /// Overrides the configured number of events.
    #[arg(long)]
    pub events: Option<u64>,
}

impl ConfigArgs {
    /// Loads the configuration, applies command line overrides and validates it.
    pub fn resolve(&self) -> Result<GeneratorConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed_policy.master_seed = seed;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(events) = self.events {
            config.events = events;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Loads the validation policy, or the defaults when no path is given.
pub fn load_policy(path: Option<&Path>) -> Result<ValidationPolicy, Box<dyn Error>> {
    Ok(match path {
        Some(path) => ValidationPolicy::load(path)?,
        None => ValidationPolicy::default(),
    })
}
