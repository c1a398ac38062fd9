//! Least-squares solver for the chain-separation regression.
//!
//! Each repeat solves
//!
//! ```text
//! minimize Σ_i (y_i − Σ_k β_k · b_k[i])^2
//! ```
//!
//! with one column per chain basis `b_k` and no intercept.
//!
//! Implementation choices:
//! - SVD rather than QR: the design is tall for normal sweeps but can be wide
//!   (one bin, two chains), and nalgebra's `QR::solve` expects square systems.
//! - For wide or rank-deficient designs the SVD solve yields the minimum-norm
//!   solution, which is what a 1-bin trial reports.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if no tolerance yields a finite solution.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() == 0 || x.ncols() == 0 || x.nrows() != y.len() {
        return None;
    }
    let svd = x.clone().svd(true, true);

    // Basis columns span several orders of magnitude (Rn-222 bins are ~1e-5),
    // so start strict and only relax if the strict solve fails.
    for &tol in &[1e-14, 1e-12, 1e-10] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `observed ≈ Σ_k β_k · columns[k]` without an intercept.
///
/// Returns `None` if the columns and the observation differ in length or the
/// solve fails.
pub fn fit_no_intercept(columns: &[&[f64]], observed: &[f64]) -> Option<Vec<f64>> {
    let n = observed.len();
    if columns.iter().any(|c| c.len() != n) {
        return None;
    }
    let x = DMatrix::from_fn(n, columns.len(), |i, k| columns[k][i]);
    let y = DVector::from_column_slice(observed);
    solve_least_squares(&x, &y).map(|beta| beta.iter().copied().collect())
}
