use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use hep_ana::{analyze, ValidationPolicy, ValidationReport};
use hep_gen::{standard_registry, GeneratorConfig};
use hep_hist::DatasetFile;

use super::output::{print_report, write_report_csv};
use super::{load_policy, ConfigArgs};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Dataset written by `hepsim generate`.
    #[arg(long)]
    pub dataset: PathBuf,
    #[command(flatten)]
    pub config: ConfigArgs,
    /// YAML validation policy; built-in defaults when omitted.
    #[arg(long)]
    pub policy: Option<PathBuf>,
    /// Output directory for `report.json`.
    #[arg(long, default_value = "hepsim-out")]
    pub out: PathBuf,
    /// Also export the checks to this CSV file.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// Validates `dataset`, writes `report.json` under `out` and prints the table.
///
/// Fails after writing when any check did not pass.
pub fn validate_into(
    policy: ValidationPolicy,
    config: GeneratorConfig,
    dataset: DatasetFile,
    out: &Path,
    csv: Option<&Path>,
) -> Result<ValidationReport, Box<dyn Error>> {
    let registry = standard_registry()?;
    let report = analyze(policy, config, &registry, dataset)?;
    report.save(&out.join("report.json"))?;
    if let Some(path) = csv {
        write_report_csv(path, &report)?;
    }
    print_report(&report);
    if !report.passed() {
        return Err(format!("validation failed with {} issue(s)", report.issues.len()).into());
    }
    Ok(report)
}

pub fn run(args: &AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let config = args.config.resolve()?;
    let policy = load_policy(args.policy.as_deref())?;
    let dataset = DatasetFile::load(&args.dataset)?;
    validate_into(policy, config, dataset, &args.out, args.csv.as_deref())?;
    Ok(())
}
