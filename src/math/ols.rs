//! Linear least squares solver.
//!
//! For a fixed Hill slope and midpoint the 4PL curve is linear in its two
//! asymptotes:
//!
//! ```text
//! f(x) = a · 1/(1 + u) + d · u/(1 + u),   u = (x / c)^b
//! ```
//!
//! so the asymptotes at a given `(b, c)` are an ordinary least squares problem.
//!
//! Implementation choices:
//! - SVD, because the design matrix is tall (n rows, 2 columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The parameter dimension is tiny, so SVD cost is irrelevant.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Progressively looser tolerances on the singular-value cutoff.
    for &tol in &[1e-14, 1e-12, 1e-10] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_splits_two_level_signal() {
        // Columns are indicator-like weights; y = 90 · w + 10 · (1 - w).
        let w = [0.9, 0.7, 0.4, 0.1];
        let x = DMatrix::from_fn(4, 2, |i, j| if j == 0 { w[i] } else { 1.0 - w[i] });
        let y = DVector::from_iterator(4, w.iter().map(|wi| 90.0 * wi + 10.0 * (1.0 - wi)));

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 90.0).abs() < 1e-9);
        assert!((beta[1] - 10.0).abs() < 1e-9);
    }
}
