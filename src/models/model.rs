//! Four-parameter logistic (4PL) model evaluation.
//!
//! ```text
//! f(x) = d + (a - d) / (1 + (x / c)^b)
//! ```
//!
//! The fitter relies on two primitive operations:
//! - predict `f(x)` given parameters (for residuals/plots)
//! - fill the gradient row `∂f/∂(a, b, c, d)` (for the Jacobian)
//!
//! Both are only defined for `x > 0` and `c > 0`.

use crate::domain::FitParameters;

/// Evaluate the 4PL curve at `x`.
pub fn logistic_4p(x: f64, p: &FitParameters) -> f64 {
    let u = (x / p.c).powf(p.b);
    p.d + (p.a - p.d) / (1.0 + u)
}

/// Fill `out` with `∂f/∂a, ∂f/∂b, ∂f/∂c, ∂f/∂d` at `x`.
///
/// With `u = (x/c)^b`:
/// - `∂f/∂a = 1 / (1 + u)`
/// - `∂f/∂b = -(a - d) · u · ln(x/c) / (1 + u)²`
/// - `∂f/∂c = (a - d) · b · u / (c (1 + u)²)`
/// - `∂f/∂d = u / (1 + u)`
///
/// # Panics
/// Panics if `out` is shorter than 4.
pub fn fill_gradient_row(x: f64, p: &FitParameters, out: &mut [f64]) {
    let ratio = x / p.c;
    let u = ratio.powf(p.b);
    let denom = 1.0 + u;
    let span = p.a - p.d;

    if u.is_infinite() {
        // Saturated at the x → ∞ side of the sigmoid.
        out[0] = 0.0;
        out[1] = 0.0;
        out[2] = 0.0;
        out[3] = 1.0;
        return;
    }

    let denom_sq = denom * denom;
    out[0] = 1.0 / denom;
    out[1] = -span * u * ratio.ln() / denom_sq;
    out[2] = span * p.b * u / (p.c * denom_sq);
    out[3] = u / denom;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn midpoint_is_halfway_between_asymptotes() {
        let p = FitParameters::new(100.0, 1.3, 2.5, 10.0);
        assert_relative_eq!(logistic_4p(2.5, &p), 55.0);
        assert_relative_eq!(logistic_4p(1e-9, &p), 100.0, epsilon = 1e-6);
        assert_relative_eq!(logistic_4p(1e9, &p), 10.0, epsilon = 1e-6);
    }

    #[test]
    fn gradient_matches_finite_difference() {
        let p = FitParameters::new(95.0, 1.1, 0.8, 4.0);
        let delta_rel = 1e-6;

        for &x in &[0.05, 0.3, 0.8, 2.0, 12.0] {
            let mut row = [0.0; 4];
            fill_gradient_row(x, &p, &mut row);

            for j in 0..4 {
                let base = p.to_array();
                let delta = base[j] * delta_rel;
                let mut plus = base;
                plus[j] += delta;
                let mut minus = base;
                minus[j] -= delta;

                let f_plus = logistic_4p(x, &FitParameters::from_slice(&plus).unwrap());
                let f_minus = logistic_4p(x, &FitParameters::from_slice(&minus).unwrap());
                let numerical = (f_plus - f_minus) / (2.0 * delta);

                assert_relative_eq!(row[j], numerical, max_relative = 1e-4, epsilon = 1e-8);
            }
        }
    }
}
