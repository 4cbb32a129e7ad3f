use std::mem;

use hep_core::errors::{ErrorInfo, HepError};
use hep_gen::{observables, GeneratorConfig};
use hep_hist::{DatasetFile, DistributionSource, HistogramSet};
use hep_kin::ParticleRegistry;
use serde::{Deserialize, Serialize};

use crate::composition::{check_composition, CompositionCheck};
use crate::entries::{check_entries, EntryCheck};
use crate::expect::Expectations;
use crate::fit::fit_distribution;
use crate::policy::ValidationPolicy;
use crate::report::{FitRecord, ValidationReport};
use crate::resonance::{extract_resonance, ResonanceCheck};

/// Lifecycle of a [`ValidationAnalyzer`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalyzerState {
    /// Constructed, no dataset yet.
    Uninitialized,
    /// Dataset accepted.
    Loaded,
    /// Checks executed.
    Validated,
    /// Report handed out.
    Reported,
}

/// Runs the validation checks over one generated dataset.
#[derive(Debug)]
pub struct ValidationAnalyzer<'r> {
    policy: ValidationPolicy,
    config: GeneratorConfig,
    registry: &'r ParticleRegistry,
    expectations: Expectations,
    state: AnalyzerState,
    distributions: HistogramSet,
    config_hash: String,
    entries: Vec<EntryCheck>,
    composition: Vec<CompositionCheck>,
    fits: Vec<FitRecord>,
    resonance: Option<ResonanceCheck>,
    issues: Vec<ErrorInfo>,
}

impl<'r> ValidationAnalyzer<'r> {
    /// Prepares an analyzer for datasets produced with `config`.
    pub fn new(
        policy: ValidationPolicy,
        config: GeneratorConfig,
        registry: &'r ParticleRegistry,
    ) -> Result<Self, HepError> {
        let expectations = Expectations::derive(&config, registry)?;
        let config_hash = config.config_hash()?;
        Ok(Self {
            policy,
            config,
            registry,
            expectations,
            state: AnalyzerState::Uninitialized,
            distributions: HistogramSet::new(),
            config_hash,
            entries: Vec::new(),
            composition: Vec::new(),
            fits: Vec::new(),
            resonance: None,
            issues: Vec::new(),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> AnalyzerState {
        self.state
    }

    /// Derived expectations the entry checks compare against.
    pub fn expectations(&self) -> &Expectations {
        &self.expectations
    }

    fn require(&self, expected: AnalyzerState, operation: &str) -> Result<(), HepError> {
        if self.state != expected {
            return Err(HepError::InvalidState(
                ErrorInfo::new("analyzer-order", "operation called out of order")
                    .with_context("operation", operation)
                    .with_context("expected", format!("{expected:?}"))
                    .with_context("actual", format!("{:?}", self.state)),
            ));
        }
        Ok(())
    }

    fn record(&mut self, issue: HepError) {
        let info = issue.info();
        tracing::warn!(code = %info.code, context = ?info.context, "validation issue");
        self.issues.push(info.clone());
    }

    /// Accepts a dataset. Every generated distribution must be present; a
    /// dataset produced from a different configuration is recorded as an issue.
    pub fn load(&mut self, dataset: DatasetFile) -> Result<(), HepError> {
        self.require(AnalyzerState::Uninitialized, "load")?;
        for name in observables::required() {
            dataset.distributions.distribution(name)?;
        }
        if dataset.provenance.config_hash != self.config_hash {
            self.record(HepError::ValidationMismatch(
                ErrorInfo::new(
                    "config-hash",
                    "dataset was generated from a different configuration",
                )
                .with_context("dataset", dataset.provenance.config_hash.clone())
                .with_context("expected", self.config_hash.clone()),
            ));
        }
        tracing::info!(
            distributions = dataset.distributions.len(),
            events = dataset.provenance.events,
            "dataset loaded"
        );
        self.distributions = dataset.distributions;
        self.state = AnalyzerState::Loaded;
        Ok(())
    }

    /// Runs entry, composition, fit and resonance checks.
    ///
    /// Mismatches and degenerate fits are collected; setup errors abort.
    pub fn validate(&mut self) -> Result<(), HepError> {
        self.require(AnalyzerState::Loaded, "validate")?;
        let span = tracing::info_span!("validate");
        let _guard = span.enter();

        self.entries = check_entries(
            &self.distributions,
            &self.expectations,
            self.policy.entry_rel_tol,
        )?;
        let entry_issues: Vec<_> = self.entries.iter().filter_map(EntryCheck::mismatch).collect();

        let composition_issues = match check_composition(
            &self.distributions,
            &self.config,
            self.registry,
            self.policy.composition_tol_pp,
        ) {
            Ok(checks) => {
                let issues: Vec<_> = checks.iter().filter_map(CompositionCheck::mismatch).collect();
                self.composition = checks;
                issues
            }
            Err(err) if !err.is_fatal() => vec![err],
            Err(err) => return Err(err),
        };

        let mut fits = Vec::with_capacity(self.policy.fits.len());
        for spec in &self.policy.fits {
            let dist = self.distributions.distribution(&spec.distribution)?;
            let attempt = fit_distribution(dist, spec.model, spec.range);
            fits.push(FitRecord::from_attempt(
                &spec.distribution,
                spec.model,
                spec.range,
                attempt,
                self.policy.max_reduced_chi2,
            )?);
        }
        let fit_issues: Vec<_> = fits.iter().filter_map(FitRecord::issue).collect();
        self.fits = fits;

        let mut resonance_issues = Vec::new();
        if let Some(spec) = &self.policy.resonance {
            let check = extract_resonance(
                &self.distributions,
                self.registry,
                spec,
                self.policy.max_reduced_chi2,
            )?;
            resonance_issues.extend(check.fits.iter().filter_map(FitRecord::issue));
            resonance_issues.extend(check.mismatch());
            self.resonance = Some(check);
        }

        for issue in entry_issues
            .into_iter()
            .chain(composition_issues)
            .chain(fit_issues)
            .chain(resonance_issues)
        {
            self.record(issue);
        }
        tracing::info!(issues = self.issues.len(), "validation finished");
        self.state = AnalyzerState::Validated;
        Ok(())
    }

    /// Hands out the report. Can be called once.
    pub fn report(&mut self) -> Result<ValidationReport, HepError> {
        self.require(AnalyzerState::Validated, "report")?;
        let report = ValidationReport::new(
            self.config_hash.clone(),
            mem::take(&mut self.entries),
            mem::take(&mut self.composition),
            mem::take(&mut self.fits),
            self.resonance.take(),
            mem::take(&mut self.issues),
        )?;
        self.state = AnalyzerState::Reported;
        Ok(report)
    }
}

/// Loads, validates and reports in one call.
pub fn analyze(
    policy: ValidationPolicy,
    config: GeneratorConfig,
    registry: &ParticleRegistry,
    dataset: DatasetFile,
) -> Result<ValidationReport, HepError> {
    let mut analyzer = ValidationAnalyzer::new(policy, config, registry)?;
    analyzer.load(dataset)?;
    analyzer.validate()?;
    analyzer.report()
}
