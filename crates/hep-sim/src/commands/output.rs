use std::error::Error;
use std::fs;
use std::path::Path;

use hep_ana::{FitOutcome, ValidationReport};
use hep_hist::HistogramSet;
use serde::Serialize;

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn csv_writer(path: &Path) -> Result<csv::Writer<fs::File>, Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(csv::Writer::from_path(path)?)
}

#[derive(Debug, Serialize)]
struct CheckRow<'a> {
    kind: &'static str,
    label: &'a str,
    expected: Option<f64>,
    observed: Option<f64>,
    deviation: Option<f64>,
    pass: bool,
}

fn check_rows(report: &ValidationReport) -> Vec<CheckRow<'_>> {
    let mut rows = Vec::new();
    for check in &report.entries {
        rows.push(CheckRow {
            kind: "entries",
            label: &check.label,
            expected: Some(check.expected),
            observed: Some(check.observed as f64),
            deviation: Some(check.relative_deviation),
            pass: check.pass,
        });
    }
    for check in &report.composition {
        rows.push(CheckRow {
            kind: "composition",
            label: &check.species,
            expected: Some(check.expected_pct),
            observed: Some(check.observed_pct),
            deviation: Some(check.delta_pp),
            pass: check.pass,
        });
    }
    let resonance_fits = report.resonance.iter().flat_map(|check| check.fits.iter());
    for record in report.fits.iter().chain(resonance_fits) {
        let reduced = match &record.outcome {
            FitOutcome::Resolved(result) => Some(result.reduced_chi2),
            FitOutcome::Unresolved(_) => None,
        };
        rows.push(CheckRow {
            kind: "fit",
            label: &record.label,
            expected: None,
            observed: reduced,
            deviation: None,
            pass: record.pass,
        });
    }
    if let Some(check) = &report.resonance {
        rows.push(CheckRow {
            kind: "resonance-mass",
            label: &check.species,
            expected: Some(check.nominal_mass),
            observed: check.mass,
            deviation: check.mass.map(|mass| mass - check.nominal_mass),
            pass: check.pass,
        });
        rows.push(CheckRow {
            kind: "resonance-width",
            label: &check.species,
            expected: Some(check.nominal_width),
            observed: check.width,
            deviation: check.width.map(|width| width - check.nominal_width),
            pass: check.pass,
        });
    }
    rows
}

/// One row per check: entries, composition, fits and resonance parameters.
pub fn write_report_csv(path: &Path, report: &ValidationReport) -> Result<(), Box<dyn Error>> {
    let mut writer = csv_writer(path)?;
    for row in check_rows(report) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Bin-by-bin dump of every distribution.
pub fn write_distributions_csv(path: &Path, set: &HistogramSet) -> Result<(), Box<dyn Error>> {
    let mut writer = csv_writer(path)?;
    writer.write_record(["distribution", "bin", "low_edge", "content", "error"])?;
    for dist in set.iter() {
        for bin in 0..dist.bins() {
            writer.write_record([
                dist.name().to_string(),
                bin.to_string(),
                format!("{:.9}", dist.bin_low_edge(bin)),
                format!("{:.9}", dist.bin_content(bin)),
                format!("{:.9}", dist.bin_error(bin)),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn verdict(pass: bool) -> &'static str {
    if pass {
        "ok"
    } else {
        "FAIL"
    }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.4}"))
}

/// Prints the checks as an aligned table on stdout.
pub fn print_report(report: &ValidationReport) {
    println!(
        "{:<14} {:<40} {:>14} {:>14} {:>10}  result",
        "check", "label", "expected", "observed", "deviation"
    );
    for row in check_rows(report) {
        println!(
            "{:<14} {:<40} {:>14} {:>14} {:>10}  {}",
            row.kind,
            row.label,
            cell(row.expected),
            cell(row.observed),
            cell(row.deviation),
            verdict(row.pass)
        );
    }
    for issue in &report.issues {
        println!("issue: {issue}");
    }
    println!(
        "{} issue(s), analysis hash {}",
        report.issues.len(),
        report.analysis_hash
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use hep_ana::EntryCheck;

    #[test]
    fn report_csv_has_one_row_per_check() {
        let entries = vec![EntryCheck {
            label: "pulse".into(),
            expected: 100.0,
            observed: 98,
            relative_deviation: 0.02,
            pass: true,
        }];
        let report =
            ValidationReport::new("hash".into(), entries, vec![], vec![], None, vec![]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checks.csv");
        write_report_csv(&path, &report).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "kind,label,expected,observed,deviation,pass");
        assert_eq!(lines[1], "entries,pulse,100.0,98.0,0.02,true");
        assert_eq!(lines.len(), 2);
    }
}
