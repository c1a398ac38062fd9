//! Analytic per-bin detector response of a decay chain.
//!
//! For unit initial parent activity, the number of stage-`j` decays in
//! `[t0, t1)` follows from the partial-fraction (Bateman) solution of the
//! linear chain ODE:
//!
//! ```text
//! D_j(t0, t1) = Σ_{r≤j} [ Π_{q≤j, q≠r} λ_q / (λ_q − λ_r) ] · (e^{−λ_r t0} − e^{−λ_r t1})
//! ```
//!
//! The basis value for bin `i` is `Σ_j w_j · D_j(iΔt, (i+1)Δt)`.
//!
//! Numerical notes:
//! - Two stages sharing a decay constant make `λ_q − λ_r` vanish. That case is
//!   a known singularity: the result is non-finite and is passed through as-is.
//! - Over an unbounded window each `D_j` sums to 1, so the bins sum to `Σ w_j`.

use crate::error::AppError;

/// Expected detections per bin for a chain with unit parent activity.
///
/// `weights` defaults to 1 for every stage.
pub fn analytic_basis(
    bin_width: f64,
    n_bins: usize,
    rates: &[f64],
    weights: Option<&[f64]>,
) -> Result<Vec<f64>, AppError> {
    if let Some(w) = weights {
        if w.len() != rates.len() {
            return Err(AppError::shape(format!(
                "Basis weights ({}) and decay constants ({}) must have the same length.",
                w.len(),
                rates.len()
            )));
        }
    }

    // Partial-fraction coefficients depend only on the rates; compute once.
    let coeffs = bateman_coefficients(rates);

    let mut out = Vec::with_capacity(n_bins);
    for i in 0..n_bins {
        let lo = i as f64;
        let hi = (i + 1) as f64;
        let mut total = 0.0;
        for (j, row) in coeffs.iter().enumerate() {
            let w = weights.map_or(1.0, |w| w[j]);
            let mut stage = 0.0;
            for (r, &c) in row.iter().enumerate() {
                // Exponent grouped as (−λ·i)·Δt so a single stage is exactly e^{−λiΔt} − e^{−λ(i+1)Δt}.
                stage += c * ((-rates[r] * lo * bin_width).exp() - (-rates[r] * hi * bin_width).exp());
            }
            total += stage * w;
        }
        out.push(total);
    }
    Ok(out)
}

/// `coeffs[j][r] = Π_{q≤j, q≠r} λ_q / (λ_q − λ_r)` for `r ≤ j`.
fn bateman_coefficients(rates: &[f64]) -> Vec<Vec<f64>> {
    (0..rates.len())
        .map(|j| {
            (0..=j)
                .map(|r| {
                    (0..=j)
                        .filter(|&q| q != r)
                        .map(|q| rates[q] / (rates[q] - rates[r]))
                        .product()
                })
                .collect()
        })
        .collect()
}
