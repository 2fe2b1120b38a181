//! Four-parameter logistic fitting.
//!
//! Given:
//! - unique concentrations `x_i` (any order)
//! - mean responses `y_i`
//!
//! we minimize `Σ (y_i - f(x_i; a, b, c, d))²` with Levenberg–Marquardt,
//! starting from an [`InitialGuess`], and report the fitted parameters with
//! `ic50 = c`.
//!
//! Two details of the parameterization:
//! - the solver works on `(a, b, ln c, d)`, so every trial point has `c > 0`
//! - before iterating, the asymptotes are re-estimated by linear least squares
//!   for the seeded `(b, c)` (the curve is linear in `a` and `d`)

use levenberg_marquardt::LeastSquaresProblem;
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};
use tracing::debug;

use crate::domain::{FitConfig, FitParameters, FitQuality};
use crate::error::Ic50Error;
use crate::fit::guess::{InitialGuess, strategy};
use crate::math::{LmOptions, levenberg_marquardt, mean, solve_least_squares};
use crate::models::{fill_gradient_row, logistic_4p};

/// Four parameters need at least four distinct concentrations.
pub const MIN_DISTINCT_CONCENTRATIONS: usize = 4;

/// Best fit for one experiment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticFit {
    pub params: FitParameters,
    pub quality: FitQuality,
}

impl LogisticFit {
    pub fn ic50(&self) -> f64 {
        self.params.c
    }
}

/// Residuals of the 4PL curve against observed means, over `θ = (a, b, ln c, d)`.
struct LogisticProblem<'a> {
    x: &'a [f64],
    y: &'a [f64],
    theta: DVector<f64>,
}

impl<'a> LogisticProblem<'a> {
    fn new(x: &'a [f64], y: &'a [f64], start: &FitParameters) -> Self {
        Self {
            x,
            y,
            theta: DVector::from_column_slice(&[start.a, start.b, start.c.ln(), start.d]),
        }
    }

    fn current(&self) -> Option<FitParameters> {
        let t = &self.theta;
        let params = FitParameters::new(t[0], t[1], t[2].exp(), t[3]);
        (params.is_finite() && params.c > 0.0).then_some(params)
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for LogisticProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, theta: &DVector<f64>) {
        self.theta.copy_from(theta);
    }

    fn params(&self) -> DVector<f64> {
        self.theta.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let params = self.current()?;
        Some(DVector::from_iterator(
            self.x.len(),
            self.x
                .iter()
                .zip(self.y.iter())
                .map(|(&x, &y)| logistic_4p(x, &params) - y),
        ))
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let params = self.current()?;
        let mut jac = DMatrix::<f64>::zeros(self.x.len(), 4);
        let mut row = [0.0; 4];
        for (i, &x) in self.x.iter().enumerate() {
            fill_gradient_row(x, &params, &mut row);
            // ∂f/∂(ln c) = c · ∂f/∂c
            row[2] *= params.c;
            for j in 0..4 {
                jac[(i, j)] = row[j];
            }
        }
        Some(jac)
    }
}

/// Fit the 4PL model using the configured initial-guess strategy.
pub fn fit_4pl(x: &[f64], y: &[f64], config: &FitConfig) -> Result<LogisticFit, Ic50Error> {
    let guess = strategy(config.guess);
    fit_4pl_with(x, y, guess.as_ref(), config)
}

/// Fit the 4PL model from an explicit initial-guess strategy.
pub fn fit_4pl_with(
    x: &[f64],
    y: &[f64],
    guess: &dyn InitialGuess,
    config: &FitConfig,
) -> Result<LogisticFit, Ic50Error> {
    validate(x, y)?;

    let distinct = count_distinct(x);
    if distinct < MIN_DISTINCT_CONCENTRATIONS {
        return Err(Ic50Error::InsufficientData {
            distinct,
            required: MIN_DISTINCT_CONCENTRATIONS,
        });
    }

    let seed = guess.guess(x, y);
    if !(seed.is_finite() && seed.c > 0.0) {
        return Err(Ic50Error::convergence(format!("Unusable initial guess: {seed:?}.")));
    }
    let start = refine_asymptotes(x, y, seed);
    debug!(?seed, ?start, n = x.len(), "starting 4PL fit");

    let opts = LmOptions {
        max_evaluations: config.max_evaluations,
        tolerance: config.tolerance,
    };
    let (problem, report) = levenberg_marquardt(LogisticProblem::new(x, y, &start), &opts)?;

    let params = problem
        .current()
        .map(FitParameters::canonical)
        .ok_or_else(|| Ic50Error::convergence(format!("Degenerate parameters: {:?}.", report.params)))?;

    let quality = fit_quality(y, report.cost, report.evaluations);
    Ok(LogisticFit { params, quality })
}

/// Least-squares asymptotes for the slope and midpoint of `seed`.
///
/// Keeps `seed` unchanged if the two-column system cannot be solved.
fn refine_asymptotes(x: &[f64], y: &[f64], seed: FitParameters) -> FitParameters {
    let mut design = DMatrix::<f64>::zeros(x.len(), 2);
    let mut row = [0.0; 4];
    for (i, &xi) in x.iter().enumerate() {
        fill_gradient_row(xi, &seed, &mut row);
        design[(i, 0)] = row[0];
        design[(i, 1)] = row[3];
    }

    match solve_least_squares(&design, &DVector::from_column_slice(y)) {
        Some(beta) => FitParameters {
            a: beta[0],
            d: beta[1],
            ..seed
        },
        None => seed,
    }
}

fn validate(x: &[f64], y: &[f64]) -> Result<(), Ic50Error> {
    if x.len() != y.len() {
        return Err(Ic50Error::invalid(format!(
            "{} concentrations but {} responses.",
            x.len(),
            y.len()
        )));
    }
    if x.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        return Err(Ic50Error::invalid("Concentrations must be finite and > 0."));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(Ic50Error::invalid("Responses must be finite."));
    }
    Ok(())
}

fn count_distinct(x: &[f64]) -> usize {
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted.dedup();
    sorted.len()
}

fn fit_quality(y: &[f64], sse: f64, evaluations: usize) -> FitQuality {
    let n = y.len();
    let ybar = mean(y).unwrap_or(0.0);
    let sst: f64 = y.iter().map(|v| (v - ybar) * (v - ybar)).sum();
    let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { 1.0 };

    FitQuality {
        sse,
        rmse: (sse / n as f64).sqrt(),
        r_squared,
        n,
        evaluations,
    }
}
