//! Reporting utilities: per-point residuals and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

pub mod format;

pub use format::*;

use crate::domain::{AggregatedPoint, FitResult};
use crate::models::logistic_4p;

/// An observed mean next to the fitted curve value.
#[derive(Debug, Clone, Copy)]
pub struct PointResidual {
    pub point: AggregatedPoint,
    pub fitted: f64,
    pub residual: f64,
}

/// Compute fitted values and residuals at each observed concentration.
pub fn compute_residuals(result: &FitResult) -> Vec<PointResidual> {
    result
        .points
        .iter()
        .map(|p| {
            let fitted = logistic_4p(p.concentration, &result.params);
            PointResidual {
                point: *p,
                fitted,
                residual: p.mean_response - fitted,
            }
        })
        .collect()
}
