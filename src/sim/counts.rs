//! Monte-Carlo arrival histograms.
//!
//! Each simulated atom walks the whole chain: one exponential waiting time per
//! stage, accumulated into absolute arrival times. Arrivals of detectable
//! stages are binned by `floor(t / Δt)`; anything at or past the end of the
//! window is dropped, not clipped.

use rand::prelude::*;

use crate::error::AppError;
use crate::sim::rng::stage_distributions;

/// Histogram of detected arrivals for `atoms` independent source atoms.
///
/// A stage is detectable when its weight is exactly 1; `weights` defaults to
/// all ones.
pub fn simulate_counts<R: Rng + ?Sized>(
    rng: &mut R,
    atoms: usize,
    bin_width: f64,
    n_bins: usize,
    rates: &[f64],
    weights: Option<&[f64]>,
) -> Result<Vec<u64>, AppError> {
    if !(bin_width.is_finite() && bin_width > 0.0) {
        return Err(AppError::config(format!("Bin width must be finite and > 0, got {bin_width}.")));
    }
    if let Some(w) = weights {
        if w.len() != rates.len() {
            return Err(AppError::shape(format!(
                "Detection weights ({}) and stage rates ({}) must have the same length.",
                w.len(),
                rates.len()
            )));
        }
    }

    let dists = stage_distributions(rates)?;
    let detectable: Vec<bool> = (0..rates.len())
        .map(|j| weights.map_or(true, |w| w[j] == 1.0))
        .collect();
    let window = n_bins as f64;

    let mut counts = vec![0u64; n_bins];
    for _ in 0..atoms {
        let mut t = 0.0;
        for (dist, &seen) in dists.iter().zip(&detectable) {
            t += dist.sample(rng);
            let bin = (t / bin_width).floor();
            if bin >= window {
                // Arrival times only grow along the chain.
                break;
            }
            if seen {
                counts[bin as usize] += 1;
            }
        }
    }
    Ok(counts)
}

/// Same as [`simulate_counts`], parameterized by mean lifetimes (1/λ).
pub fn simulate_counts_from_lifetimes<R: Rng + ?Sized>(
    rng: &mut R,
    atoms: usize,
    bin_width: f64,
    n_bins: usize,
    lifetimes: &[f64],
    weights: Option<&[f64]>,
) -> Result<Vec<u64>, AppError> {
    let rates: Vec<f64> = lifetimes.iter().map(|tau| 1.0 / tau).collect();
    simulate_counts(rng, atoms, bin_width, n_bins, &rates, weights)
}
