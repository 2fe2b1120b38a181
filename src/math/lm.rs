//! Levenberg–Marquardt driver.
//!
//! The iteration itself is the MINPACK `lmder` port from the
//! `levenberg-marquardt` crate. Around it this module enforces:
//! - a hard cap on residual evaluations
//! - a rank check on the Jacobian, both at the starting point and at the
//!   solution (a parameter the residuals do not depend on cannot be estimated)
//! - one error type: every termination other than convergence is a
//!   [`Ic50Error::FitConvergence`]

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt, TerminationReason};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, Dyn};
use tracing::debug;

use crate::error::Ic50Error;

/// Column norms at or below this fraction of the largest column are treated as zero.
const SINGULAR_RTOL: f64 = 1e-10;

/// Solver options.
#[derive(Debug, Clone, Copy)]
pub struct LmOptions {
    /// Maximum number of residual evaluations.
    pub max_evaluations: usize,
    /// Relative tolerance for the cost-reduction and step-size tests.
    pub tolerance: f64,
}

/// Converged solution.
#[derive(Debug, Clone)]
pub struct LmReport {
    pub params: Vec<f64>,
    /// Sum of squared residuals at `params`.
    pub cost: f64,
    pub evaluations: usize,
}

/// Minimize `‖r(p)‖²` starting from the problem's current parameters.
///
/// Returns the problem with its parameters set to the solution.
pub fn levenberg_marquardt<P>(problem: P, opts: &LmOptions) -> Result<(P, LmReport), Ic50Error>
where
    P: LeastSquaresProblem<
            f64,
            Dyn,
            Dyn,
            ResidualStorage = Owned<f64, Dyn>,
            JacobianStorage = Owned<f64, Dyn, Dyn>,
            ParameterStorage = Owned<f64, Dyn>,
        >,
{
    if opts.max_evaluations == 0 {
        return Err(Ic50Error::invalid("Evaluation budget must be > 0."));
    }
    if !(opts.tolerance.is_finite() && opts.tolerance >= 0.0) {
        return Err(Ic50Error::invalid("Tolerance must be finite and >= 0."));
    }
    let n_params = problem.params().len();
    if n_params == 0 {
        return Err(Ic50Error::invalid("No parameters to fit."));
    }
    let tol = opts.tolerance.max(f64::EPSILON);

    let jac0 = finite_jacobian(&problem)?;
    ensure_full_rank(&jac0, "initial guess")?;

    // The solver budgets `patience · (n + 1)` evaluations.
    let patience = opts.max_evaluations.div_ceil(n_params + 1).max(1);
    let (problem, report) = LevenbergMarquardt::new()
        .with_ftol(tol)
        .with_xtol(tol)
        .with_patience(patience)
        .minimize(problem);

    let budget_exhausted = || {
        Ic50Error::convergence(format!(
            "No convergence within {} evaluations.",
            opts.max_evaluations
        ))
    };
    match &report.termination {
        TerminationReason::ResidualsZero
        | TerminationReason::Orthogonal
        | TerminationReason::Converged { .. } => {}
        TerminationReason::LostPatience => return Err(budget_exhausted()),
        other => return Err(Ic50Error::convergence(format!("Solver stopped: {other:?}."))),
    }
    if report.number_of_evaluations > opts.max_evaluations {
        return Err(budget_exhausted());
    }

    let final_jac = finite_jacobian(&problem)?;
    ensure_full_rank(&final_jac, "converged point")?;

    let cost = problem
        .residuals()
        .map(|r| r.norm_squared())
        .filter(|c| c.is_finite())
        .ok_or_else(|| Ic50Error::convergence("Non-finite residuals at converged point."))?;

    debug!(
        evaluations = report.number_of_evaluations,
        cost,
        termination = ?report.termination,
        "levenberg-marquardt converged"
    );

    let lm_report = LmReport {
        params: problem.params().iter().copied().collect(),
        cost,
        evaluations: report.number_of_evaluations,
    };
    Ok((problem, lm_report))
}

fn finite_jacobian<P>(problem: &P) -> Result<DMatrix<f64>, Ic50Error>
where
    P: LeastSquaresProblem<f64, Dyn, Dyn, JacobianStorage = Owned<f64, Dyn, Dyn>>,
{
    problem
        .jacobian()
        .filter(|j| j.iter().all(|v| v.is_finite()))
        .ok_or_else(|| Ic50Error::convergence("Non-finite Jacobian."))
}

/// A column whose norm vanishes relative to the largest column means the
/// corresponding parameter has no influence on the residuals.
fn ensure_full_rank(jac: &DMatrix<f64>, at: &str) -> Result<(), Ic50Error> {
    let norms: Vec<f64> = jac.column_iter().map(|c| c.norm()).collect();
    let max_norm = norms.iter().copied().fold(0.0, f64::max);
    if max_norm == 0.0 || norms.iter().any(|&n| n <= SINGULAR_RTOL * max_norm) {
        return Err(Ic50Error::convergence(format!("Singular Jacobian at {at}.")));
    }
    Ok(())
}
