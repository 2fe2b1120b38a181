//! Initial-guess strategies for the 4PL optimizer.
//!
//! Levenberg–Marquardt is a local method, so the starting point decides which
//! basin it lands in. Strategies are pluggable behind [`InitialGuess`].

use crate::domain::{FitParameters, GuessKind};
use crate::math::{median, ols_slope};

/// Produces a starting parameter vector from the data.
///
/// Callers pass equal-length, non-empty slices with `x > 0`.
pub trait InitialGuess {
    fn guess(&self, x: &[f64], y: &[f64]) -> FitParameters;
}

/// Standard inhibitory heuristic: `a = max(y)`, `b = -1`, `c = median(x)`, `d = min(y)`.
///
/// Shape is assumed, not detected.
#[derive(Debug, Clone, Copy, Default)]
pub struct InhibitoryGuess;

impl InitialGuess for InhibitoryGuess {
    fn guess(&self, x: &[f64], y: &[f64]) -> FitParameters {
        let (lo, hi) = response_bounds(y);
        FitParameters::new(hi, -1.0, median(x).unwrap_or(1.0), lo)
    }
}

/// Picks the asymptotes from the direction in which responses trend.
///
/// The trend is the sign of the least-squares slope of `y` against `ln x`.
/// Falling data starts from `a = max(y)`, rising data from `a = min(y)`; both
/// use `b = 1`, so `a` is the low-concentration asymptote from the start.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeDetectingGuess;

/// Direction in which responses move as concentration increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
}

impl ShapeDetectingGuess {
    pub fn trend(x: &[f64], y: &[f64]) -> Option<Trend> {
        let log_x: Vec<f64> = x.iter().map(|v| v.ln()).collect();
        let slope = ols_slope(&log_x, y)?;
        if slope >= 0.0 {
            Some(Trend::Rising)
        } else {
            Some(Trend::Falling)
        }
    }
}

impl InitialGuess for ShapeDetectingGuess {
    fn guess(&self, x: &[f64], y: &[f64]) -> FitParameters {
        let (lo, hi) = response_bounds(y);
        let c = median(x).unwrap_or(1.0);
        match Self::trend(x, y) {
            Some(Trend::Rising) => FitParameters::new(lo, 1.0, c, hi),
            Some(Trend::Falling) | None => FitParameters::new(hi, 1.0, c, lo),
        }
    }
}

/// Strategy selected by configuration.
pub fn strategy(kind: GuessKind) -> Box<dyn InitialGuess + Send + Sync> {
    match kind {
        GuessKind::Inhibitory => Box::new(InhibitoryGuess),
        GuessKind::Auto => Box::new(ShapeDetectingGuess),
    }
}

fn response_bounds(y: &[f64]) -> (f64, f64) {
    let lo = y.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: [f64; 5] = [0.01, 0.1, 1.0, 10.0, 100.0];

    #[test]
    fn inhibitory_guess_matches_heuristic() {
        let y = [98.0, 90.0, 55.0, 12.0, 5.0];
        let g = InhibitoryGuess.guess(&X, &y);
        assert_eq!(g, FitParameters::new(98.0, -1.0, 1.0, 5.0));
    }

    #[test]
    fn shape_detection_orients_asymptotes() {
        let falling = [98.0, 90.0, 55.0, 12.0, 5.0];
        let rising = [5.0, 12.0, 55.0, 90.0, 98.0];

        assert_eq!(ShapeDetectingGuess::trend(&X, &falling), Some(Trend::Falling));
        assert_eq!(ShapeDetectingGuess::trend(&X, &rising), Some(Trend::Rising));

        assert_eq!(
            ShapeDetectingGuess.guess(&X, &falling),
            FitParameters::new(98.0, 1.0, 1.0, 5.0)
        );
        assert_eq!(
            ShapeDetectingGuess.guess(&X, &rising),
            FitParameters::new(5.0, 1.0, 1.0, 98.0)
        );
    }

    #[test]
    fn strategy_follows_kind() {
        let y = [5.0, 12.0, 55.0, 90.0, 98.0];
        assert_eq!(strategy(GuessKind::Inhibitory).guess(&X, &y).b, -1.0);
        assert_eq!(strategy(GuessKind::Auto).guess(&X, &y).a, 5.0);
    }
}
