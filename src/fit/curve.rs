//! Dense curve samples for display.
//!
//! Dose-response charts use a log-scale concentration axis, so samples are
//! spaced geometrically between the lowest and highest observed concentration.

use crate::domain::FitParameters;
use crate::error::Ic50Error;
use crate::models::logistic_4p;

/// `n` geometrically spaced values from `min` to `max` inclusive.
///
/// The endpoints are exact; consecutive ratios are equal up to rounding.
pub fn log_space(min: f64, max: f64, n: usize) -> Result<Vec<f64>, Ic50Error> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > min) {
        return Err(Ic50Error::invalid(format!(
            "Log-spaced range requires 0 < min < max, got [{min}, {max}]."
        )));
    }
    if n < 2 {
        return Err(Ic50Error::invalid("Curve needs at least 2 samples."));
    }

    let ln_min = min.ln();
    let step = (max.ln() - ln_min) / (n as f64 - 1.0);

    let mut out = Vec::with_capacity(n);
    out.push(min);
    for i in 1..n - 1 {
        out.push((ln_min + step * i as f64).exp());
    }
    out.push(max);
    Ok(out)
}

/// Sample the fitted curve at `n` log-spaced concentrations over `[x_min, x_max]`.
pub fn synthesize_curve(
    params: &FitParameters,
    x_min: f64,
    x_max: f64,
    n: usize,
) -> Result<Vec<(f64, f64)>, Ic50Error> {
    Ok(log_space(x_min, x_max, n)?
        .into_iter()
        .map(|x| (x, logistic_4p(x, params)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn log_space_endpoints_and_ratio() {
        let xs = log_space(0.01, 100.0, 5).unwrap();
        assert_eq!(xs.len(), 5);
        assert_eq!(xs[0], 0.01);
        assert_eq!(xs[4], 100.0);
        assert_relative_eq!(xs[1], 0.1, max_relative = 1e-12);
        assert_relative_eq!(xs[2], 1.0, max_relative = 1e-12);
        assert_relative_eq!(xs[3], 10.0, max_relative = 1e-12);
    }

    #[test]
    fn log_space_rejects_degenerate_ranges() {
        assert!(log_space(0.0, 1.0, 10).is_err());
        assert!(log_space(1.0, 1.0, 10).is_err());
        assert!(log_space(2.0, 1.0, 10).is_err());
        assert!(log_space(0.1, 1.0, 1).is_err());
    }

    #[test]
    fn curve_passes_through_midpoint() {
        let p = FitParameters::new(100.0, 1.0, 1.0, 0.0);
        let curve = synthesize_curve(&p, 0.01, 100.0, 101).unwrap();
        assert_eq!(curve.len(), 101);
        let (x_mid, y_mid) = curve[50];
        assert_relative_eq!(x_mid, 1.0, max_relative = 1e-12);
        assert_relative_eq!(y_mid, 50.0, max_relative = 1e-9);
        assert!(curve.windows(2).all(|w| w[1].1 < w[0].1));
    }
}
