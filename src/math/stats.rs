//! Descriptive statistics over response samples.
//!
//! All functions return `None` on empty input rather than producing `NaN`.

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (denominator `n`, not `n - 1`).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / values.len() as f64).sqrt())
}

/// Median (mean of the two middle values for even lengths).
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Ordinary least-squares slope of `y` on `x`.
///
/// Returns `None` when `x` has no spread.
pub fn ols_slope(x: &[f64], y: &[f64]) -> Option<f64> {
    let xbar = mean(x)?;
    let ybar = mean(y)?;

    let mut cov = 0.0;
    let mut var = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - xbar;
        cov += dx * (yi - ybar);
        var += dx * dx;
    }
    if var <= 1e-18 || !cov.is_finite() {
        return None;
    }
    Some(cov / var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn population_std_uses_n_denominator() {
        let values = [95.0, 97.0, 99.0];
        assert_relative_eq!(mean(&values).unwrap(), 97.0);
        // sqrt(8/3)
        assert_relative_eq!(population_std(&values).unwrap(), 1.632_993_161_855_452, epsilon = 1e-12);
    }

    #[test]
    fn median_handles_odd_and_even_lengths() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn slope_sign_follows_trend() {
        let x = [0.0, 1.0, 2.0, 3.0];
        assert!(ols_slope(&x, &[10.0, 8.0, 5.0, 1.0]).unwrap() < 0.0);
        assert!(ols_slope(&x, &[1.0, 2.0, 4.0, 9.0]).unwrap() > 0.0);
        assert_eq!(ols_slope(&[1.0, 1.0], &[2.0, 3.0]), None);
    }
}
