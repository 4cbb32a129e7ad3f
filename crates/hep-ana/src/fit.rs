use hep_core::errors::{ErrorInfo, HepError};
use hep_hist::Distribution;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::special::chi2_probability;

const MAX_ITERATIONS: usize = 200;
const LAMBDA_START: f64 = 1e-3;
const LAMBDA_MAX: f64 = 1e12;
const CONVERGENCE: f64 = 1e-10;

fn degenerate(code: &str, message: &str, label: &str) -> HepError {
    HepError::FitDegenerate(ErrorInfo::new(code, message).with_context("distribution", label))
}

/// Parametric shape fitted to a binned distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitModel {
    /// `p0`.
    Constant,
    /// `exp(p0 + p1 x)`.
    Exponential,
    /// `A exp(-((x - mean) / sigma)² / 2)`.
    Gaussian,
}

impl FitModel {
    /// Parameter names in fit order.
    pub fn parameter_names(self) -> &'static [&'static str] {
        match self {
            FitModel::Constant => &["p0"],
            FitModel::Exponential => &["p0", "p1"],
            FitModel::Gaussian => &["constant", "mean", "sigma"],
        }
    }

    /// Evaluates the model at `x`.
    pub fn evaluate(self, params: &[f64], x: f64) -> f64 {
        match self {
            FitModel::Constant => params[0],
            FitModel::Exponential => (params[0] + params[1] * x).exp(),
            FitModel::Gaussian => {
                let z = (x - params[1]) / params[2];
                params[0] * (-0.5 * z * z).exp()
            }
        }
    }

    fn gradient(self, params: &[f64], x: f64, out: &mut [f64]) {
        match self {
            FitModel::Constant => out[0] = 1.0,
            FitModel::Exponential => {
                let value = self.evaluate(params, x);
                out[0] = value;
                out[1] = value * x;
            }
            FitModel::Gaussian => {
                let sigma = params[2];
                let z = (x - params[1]) / sigma;
                let shape = (-0.5 * z * z).exp();
                out[0] = shape;
                out[1] = params[0] * shape * z / sigma;
                out[2] = params[0] * shape * z * z / sigma;
            }
        }
    }
}

/// Fitted parameter with its one-sigma error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitParameter {
    /// Parameter name.
    pub name: String,
    /// Best-fit value.
    pub value: f64,
    /// Square root of the covariance diagonal.
    pub error: f64,
}

/// Outcome of a resolved least-squares fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Fitted model.
    pub model: FitModel,
    /// Best-fit parameters.
    pub parameters: Vec<FitParameter>,
    /// Weighted sum of squared residuals.
    pub chi2: f64,
    /// Fitted bins minus free parameters.
    pub ndf: usize,
    /// `chi2 / ndf`.
    pub reduced_chi2: f64,
    /// Probability of a larger chi-square.
    pub probability: f64,
}

impl FitResult {
    /// Looks up a parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&FitParameter> {
        self.parameters.iter().find(|param| param.name == name)
    }
}

/// Bin centers, contents and errors selected for a fit.
#[derive(Debug, Clone, PartialEq)]
struct Points {
    x: Vec<f64>,
    y: Vec<f64>,
    sigma: Vec<f64>,
}

impl Points {
    fn collect(dist: &Distribution, range: [f64; 2]) -> Self {
        let mut points = Points {
            x: Vec::new(),
            y: Vec::new(),
            sigma: Vec::new(),
        };
        for index in 0..dist.bins() {
            let center = dist.bin_center(index);
            if center < range[0] || center >= range[1] {
                continue;
            }
            let error = dist.bin_error(index);
            if error <= 0.0 || !error.is_finite() {
                continue;
            }
            points.x.push(center);
            points.y.push(dist.bin_content(index));
            points.sigma.push(error);
        }
        points
    }

    fn len(&self) -> usize {
        self.x.len()
    }

    fn chi2(&self, model: FitModel, params: &[f64]) -> f64 {
        (0..self.len())
            .map(|i| {
                let residual = (self.y[i] - model.evaluate(params, self.x[i])) / self.sigma[i];
                residual * residual
            })
            .sum()
    }

    fn normal_equations(&self, model: FitModel, params: &[f64]) -> (DMatrix<f64>, DVector<f64>) {
        let k = params.len();
        let mut alpha = DMatrix::<f64>::zeros(k, k);
        let mut beta = DVector::<f64>::zeros(k);
        let mut grad = vec![0.0; k];
        for i in 0..self.len() {
            model.gradient(params, self.x[i], &mut grad);
            let weight = 1.0 / (self.sigma[i] * self.sigma[i]);
            let residual = self.y[i] - model.evaluate(params, self.x[i]);
            for a in 0..k {
                beta[a] += weight * residual * grad[a];
                for b in 0..=a {
                    alpha[(a, b)] += weight * grad[a] * grad[b];
                }
            }
        }
        for a in 0..k {
            for b in 0..a {
                alpha[(b, a)] = alpha[(a, b)];
            }
        }
        (alpha, beta)
    }
}

fn initial_guess(model: FitModel, points: &Points) -> Vec<f64> {
    match model {
        FitModel::Constant => vec![points.y.iter().sum::<f64>() / points.len() as f64],
        FitModel::Exponential => {
            // Weighted straight line through ln(y) over the positive bins.
            let (mut sw, mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0, 0.0);
            for i in 0..points.len() {
                if points.y[i] <= 0.0 {
                    continue;
                }
                let w = (points.y[i] / points.sigma[i]).powi(2);
                let ly = points.y[i].ln();
                sw += w;
                sx += w * points.x[i];
                sy += w * ly;
                sxx += w * points.x[i] * points.x[i];
                sxy += w * points.x[i] * ly;
            }
            let det = sw * sxx - sx * sx;
            if sw <= 0.0 || det.abs() < f64::EPSILON {
                return vec![0.0, 0.0];
            }
            let slope = (sw * sxy - sx * sy) / det;
            vec![(sy - slope * sx) / sw, slope]
        }
        FitModel::Gaussian => {
            let (mut sum, mut first) = (0.0, 0.0);
            let mut peak = (0.0f64, 0.0f64);
            for i in 0..points.len() {
                let y = points.y[i].max(0.0);
                sum += y;
                first += y * points.x[i];
                if points.y[i] > peak.0 {
                    peak = (points.y[i], points.x[i]);
                }
            }
            if sum <= 0.0 {
                let mid = 0.5 * (points.x[0] + points.x[points.len() - 1]);
                return vec![1.0, mid, (points.x[points.len() - 1] - points.x[0]).max(1e-3)];
            }
            let mean = first / sum;
            let second: f64 = (0..points.len())
                .map(|i| points.y[i].max(0.0) * (points.x[i] - mean).powi(2))
                .sum();
            let spacing = if points.len() > 1 {
                points.x[1] - points.x[0]
            } else {
                1.0
            };
            let sigma = (second / sum).sqrt().max(spacing);
            vec![peak.0, mean, sigma]
        }
    }
}

fn finish(
    model: FitModel,
    points: &Points,
    params: &[f64],
    covariance: &DMatrix<f64>,
) -> FitResult {
    let chi2 = points.chi2(model, params);
    let ndf = points.len() - params.len();
    let parameters = model
        .parameter_names()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut value = params[i];
            if model == FitModel::Gaussian && i == 2 {
                value = value.abs();
            }
            FitParameter {
                name: (*name).to_string(),
                value,
                error: covariance[(i, i)].max(0.0).sqrt(),
            }
        })
        .collect();
    FitResult {
        model,
        parameters,
        chi2,
        ndf,
        reduced_chi2: chi2 / ndf as f64,
        probability: chi2_probability(chi2, ndf),
    }
}

fn levenberg_marquardt(
    model: FitModel,
    points: &Points,
    mut params: Vec<f64>,
    label: &str,
) -> Result<FitResult, HepError> {
    let k = params.len();
    let mut lambda = LAMBDA_START;
    let mut chi2 = points.chi2(model, &params);
    for _ in 0..MAX_ITERATIONS {
        let (alpha, beta) = points.normal_equations(model, &params);
        let mut damped = alpha.clone();
        for a in 0..k {
            damped[(a, a)] *= 1.0 + lambda;
        }
        let Some(step) = damped.lu().solve(&beta) else {
            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                break;
            }
            continue;
        };
        let trial: Vec<f64> = params.iter().zip(step.iter()).map(|(p, d)| p + d).collect();
        let trial_chi2 = points.chi2(model, &trial);
        if trial_chi2.is_finite() && trial_chi2 <= chi2 {
            let improvement = chi2 - trial_chi2;
            params = trial;
            chi2 = trial_chi2;
            lambda = (lambda / 10.0).max(1e-12);
            if improvement <= CONVERGENCE * chi2.max(1.0) {
                break;
            }
        } else {
            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                break;
            }
        }
    }
    if params.iter().any(|p| !p.is_finite()) {
        return Err(degenerate("non-finite", "fit diverged", label));
    }
    let (alpha, _) = points.normal_equations(model, &params);
    let covariance = alpha
        .try_inverse()
        .ok_or_else(|| degenerate("singular-normal-matrix", "normal matrix is singular", label))?;
    Ok(finish(model, points, &params, &covariance))
}

fn fit_constant(points: &Points, label: &str) -> Result<FitResult, HepError> {
    let (mut sw, mut swy) = (0.0, 0.0);
    for i in 0..points.len() {
        let w = 1.0 / (points.sigma[i] * points.sigma[i]);
        sw += w;
        swy += w * points.y[i];
    }
    if sw <= 0.0 {
        return Err(degenerate("singular-normal-matrix", "no weight in fit range", label));
    }
    let covariance = DMatrix::from_element(1, 1, 1.0 / sw);
    Ok(finish(FitModel::Constant, points, &[swy / sw], &covariance))
}

/// Fits `model` to the bins of `dist` whose centers lie in `range`.
///
/// Bins without statistical error are skipped. Fails with
/// [`HepError::FitDegenerate`] when no degrees of freedom remain or the normal
/// matrix cannot be inverted.
pub fn fit_distribution(
    dist: &Distribution,
    model: FitModel,
    range: [f64; 2],
) -> Result<FitResult, HepError> {
    fit_with_guess(dist, model, range, None)
}

/// Like [`fit_distribution`], starting the iteration from `guess` when given.
pub fn fit_with_guess(
    dist: &Distribution,
    model: FitModel,
    range: [f64; 2],
    guess: Option<&[f64]>,
) -> Result<FitResult, HepError> {
    let label = dist.name();
    let points = Points::collect(dist, range);
    let k = model.parameter_names().len();
    if points.len() <= k {
        return Err(HepError::FitDegenerate(
            ErrorInfo::new("no-degrees-of-freedom", "not enough populated bins in fit range")
                .with_context("distribution", label)
                .with_context("points", points.len().to_string())
                .with_context("parameters", k.to_string()),
        ));
    }
    match model {
        FitModel::Constant => fit_constant(&points, label),
        _ => {
            let start = match guess {
                Some(values) if values.len() == k => values.to_vec(),
                _ => initial_guess(model, &points),
            };
            levenberg_marquardt(model, &points, start, label)
        }
    }
}
