//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during aggregation and fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default cap on residual evaluations for the optimizer.
pub const DEFAULT_MAX_EVALUATIONS: usize = 10_000;

/// Default number of points in the synthesized display curve.
pub const DEFAULT_CURVE_SAMPLES: usize = 100;

/// Default relative tolerance for solver convergence tests.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default concentration units label (reporting only, never converted).
pub const DEFAULT_UNITS: &str = "µM";

/// One concentration with its replicate responses.
///
/// The concentration is stated once; replicates are never re-keyed by a
/// repeated concentration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcentrationPoint {
    pub concentration: f64,
    pub responses: Vec<f64>,
}

impl ConcentrationPoint {
    pub fn new(concentration: f64, responses: Vec<f64>) -> Self {
        Self {
            concentration,
            responses,
        }
    }

    pub fn replicates(&self) -> usize {
        self.responses.len()
    }
}

/// Replicates collapsed to mean and population standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPoint {
    pub concentration: f64,
    pub mean_response: f64,
    pub std_response: f64,
}

/// Parameters of `response(x) = d + (a - d) / (1 + (x / c)^b)`.
///
/// Fitted parameters are reported with `b > 0`, so `a` is the response as
/// `x → 0` and `d` the response as `x → ∞`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitParameters {
    /// Asymptotic response at x → 0.
    pub a: f64,
    /// Hill slope.
    pub b: f64,
    /// Inflection point (IC50), same units as the input concentrations.
    pub c: f64,
    /// Asymptotic response at x → ∞.
    pub d: f64,
}

impl FitParameters {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// `None` unless `p` holds exactly `[a, b, c, d]`.
    pub fn from_slice(p: &[f64]) -> Option<Self> {
        match *p {
            [a, b, c, d] => Some(Self { a, b, c, d }),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// The same curve expressed with a non-negative Hill slope.
    ///
    /// `(a, b, c, d)` and `(d, -b, c, a)` describe identical curves; this picks
    /// the representative where `a` is the low-concentration asymptote.
    pub fn canonical(self) -> Self {
        if self.b < 0.0 {
            Self {
                a: self.d,
                b: -self.b,
                c: self.c,
                d: self.a,
            }
        } else {
            self
        }
    }
}

/// Goodness-of-fit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub n: usize,
    /// Residual evaluations spent by the optimizer.
    pub evaluations: usize,
}

/// Everything a display collaborator needs for one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub ic50: f64,
    pub params: FitParameters,
    pub quality: FitQuality,
    pub points: Vec<AggregatedPoint>,
    pub curve_samples: Vec<(f64, f64)>,
}

/// Which initial-guess strategy seeds the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GuessKind {
    /// `a = max(y), b = -1, c = median(x), d = min(y)`; assumes inhibitory shape.
    #[default]
    Inhibitory,
    /// Inspect whether responses rise or fall with concentration first.
    Auto,
}

/// A calculation's configuration as understood by the pipeline.
///
/// This is derived from CLI flags and an optional config file (plus defaults).
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    pub max_evaluations: usize,
    pub curve_samples: usize,
    pub guess: GuessKind,
    pub tolerance: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            curve_samples: DEFAULT_CURVE_SAMPLES,
            guess: GuessKind::default(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub created_at: DateTime<Utc>,
    pub units: String,
    pub ic50: f64,
    pub params: FitParameters,
    pub fit_quality: FitQuality,
    pub points: Vec<AggregatedPoint>,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub concentration: Vec<f64>,
    pub response: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_flips_negative_slope() {
        let p = FitParameters::new(5.0, -1.2, 3.0, 100.0).canonical();
        assert_eq!(p, FitParameters::new(100.0, 1.2, 3.0, 5.0));

        let q = FitParameters::new(100.0, 0.8, 3.0, 5.0);
        assert_eq!(q.canonical(), q);
    }

    #[test]
    fn from_slice_needs_exactly_four_values() {
        assert_eq!(
            FitParameters::from_slice(&[1.0, 2.0, 3.0, 4.0]),
            Some(FitParameters::new(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(FitParameters::from_slice(&[1.0, 2.0, 3.0]), None);
        assert_eq!(FitParameters::from_slice(&[1.0; 5]), None);
    }

    #[test]
    fn guess_kind_serializes_lowercase() {
        let s = serde_json::to_string(&GuessKind::Auto).unwrap();
        assert_eq!(s, "\"auto\"");
    }
}
