use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use super::analyze::validate_into;
use super::generate::generate_into;
use super::{load_policy, ConfigArgs};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    /// YAML validation policy; built-in defaults when omitted.
    #[arg(long)]
    pub policy: Option<PathBuf>,
    /// Output directory for the dataset, run summary and report.
    #[arg(long, default_value = "hepsim-out")]
    pub out: PathBuf,
    /// Also export the checks to this CSV file.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let config = args.config.resolve()?;
    let policy = load_policy(args.policy.as_deref())?;
    let dataset = generate_into(&config, &args.out)?;
    validate_into(policy, config, dataset, &args.out, args.csv.as_deref())?;
    Ok(())
}
