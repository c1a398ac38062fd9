//! One-interval population stepping across chain stages.
//!
//! Given how many atoms currently sit in each stage, every atom independently
//! walks the rest of the chain with exponential waiting times. An atom of
//! stage `t` has left stage `k ≥ t` within the interval when its cumulative
//! waiting time through `k` is below the interval length.
//!
//! This is a standalone utility; the sweep pipeline does not call it.

use rand::Rng;
use serde::Serialize;

use crate::error::AppError;
use crate::sim::rng::exp_matrix;

/// Result of one [`step_state`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    /// Atoms per stage after the interval.
    pub state: Vec<u64>,
    /// Decays out of each stage during the interval.
    pub transitions: Vec<u64>,
    /// `Σ transitions[s] · weights[s]`.
    pub detections: f64,
}

/// Advance a population `state` by `interval` seconds.
pub fn step_state<R: Rng + ?Sized>(
    rng: &mut R,
    state: &[u64],
    interval: f64,
    rates: &[f64],
    weights: Option<&[f64]>,
) -> Result<StepOutcome, AppError> {
    let weights_len = weights.map_or(state.len(), <[f64]>::len);
    if state.len() != rates.len() || state.len() != weights_len {
        return Err(AppError::shape(format!(
            "Length of state ({}), rates ({}) and weights ({}) must match.",
            state.len(),
            rates.len(),
            weights_len
        )));
    }

    if interval.is_nan() || interval < 0.0 {
        return Err(AppError::config(format!(
            "Interval must be a non-negative number of seconds, got {interval}."
        )));
    }

    let n = state.len();
    let mut transitions = vec![0u64; n];
    for (t, &atoms) in state.iter().enumerate() {
        if atoms == 0 {
            continue;
        }
        let draws = exp_matrix(rng, atoms as usize, &rates[t..])?;
        for row in draws.row_iter() {
            let mut elapsed = 0.0;
            for (k, dt) in row.iter().enumerate() {
                elapsed += dt;
                if !(elapsed < interval) {
                    break;
                }
                transitions[t + k] += 1;
            }
        }
    }

    // Passing stage s implies passing s-1, so `state[s] + transitions[s-1] >= transitions[s]`.
    let next: Vec<u64> = (0..n)
        .map(|s| {
            let inflow = if s == 0 { 0 } else { transitions[s - 1] };
            state[s] + inflow - transitions[s]
        })
        .collect();

    let detections = transitions
        .iter()
        .enumerate()
        .map(|(s, &c)| c as f64 * weights.map_or(1.0, |w| w[s]))
        .sum();

    Ok(StepOutcome {
        state: next,
        transitions,
        detections,
    })
}
