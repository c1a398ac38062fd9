//! Fixed Rn-222 and Rn-220 decay chains.
//!
//! Half-lives are in seconds. A chain is built once at startup and handed to
//! the basis generator and the simulator by reference.

use serde::Serialize;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;

/// One decay stage of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stage {
    pub nuclide: &'static str,
    /// Half-life in seconds.
    pub half_life: f64,
    /// Whether this stage's decay emits an alpha the detector sees.
    pub alpha_detectable: bool,
}

impl Stage {
    pub const fn new(nuclide: &'static str, half_life: f64, alpha_detectable: bool) -> Self {
        Self {
            nuclide,
            half_life,
            alpha_detectable,
        }
    }

    pub fn decay_constant(&self) -> f64 {
        std::f64::consts::LN_2 / self.half_life
    }
}

/// An ordered decay chain, parent first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecayChain {
    pub name: &'static str,
    stages: Vec<Stage>,
}

impl DecayChain {
    pub fn new(name: &'static str, stages: Vec<Stage>) -> Self {
        Self { name, stages }
    }

    /// Rn-222 series down to Po-214.
    pub fn rn222() -> Self {
        Self::new(
            "Rn222",
            vec![
                Stage::new("Rn-222", 3.8235 * DAY, true),
                Stage::new("Po-218", 3.098 * MINUTE, true),
                Stage::new("Pb-214", 26.8 * MINUTE, false),
                Stage::new("Bi-214", 19.9 * MINUTE, false),
                Stage::new("Po-214", 164.3e-6, true),
            ],
        )
    }

    /// Rn-220 (thoron) series down to Bi-212.
    ///
    /// Bi-212 branches alpha/beta, but the beta branch feeds Po-212 which
    /// alpha-decays almost immediately, so the stage counts as detectable.
    pub fn rn220() -> Self {
        Self::new(
            "Rn220",
            vec![
                Stage::new("Rn-220", 55.6, true),
                Stage::new("Po-216", 0.145, true),
                Stage::new("Pb-212", 10.64 * HOUR, false),
                Stage::new("Bi-212", 60.55 * MINUTE, true),
            ],
        )
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// λ = ln2 / half-life per stage (1/s).
    pub fn decay_constants(&self) -> Vec<f64> {
        self.stages.iter().map(Stage::decay_constant).collect()
    }

    /// Mean lifetime 1/λ per stage (s).
    pub fn mean_lifetimes(&self) -> Vec<f64> {
        self.decay_constants().iter().map(|l| 1.0 / l).collect()
    }

    /// Alpha-detectability flags as 0/1 weights.
    pub fn alpha_weights(&self) -> Vec<f64> {
        self.stages
            .iter()
            .map(|s| if s.alpha_detectable { 1.0 } else { 0.0 })
            .collect()
    }
}

/// Both chains, as consumed by the trial runner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainPair {
    pub rn222: DecayChain,
    pub rn220: DecayChain,
}

impl Default for ChainPair {
    fn default() -> Self {
        Self {
            rn222: DecayChain::rn222(),
            rn220: DecayChain::rn220(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_vectors_match_stage_count() {
        for chain in [DecayChain::rn222(), DecayChain::rn220()] {
            let n = chain.len();
            assert_eq!(chain.decay_constants().len(), n);
            assert_eq!(chain.mean_lifetimes().len(), n);
            assert_eq!(chain.alpha_weights().len(), n);
        }
        assert_eq!(DecayChain::rn222().len(), 5);
        assert_eq!(DecayChain::rn220().len(), 4);
    }

    #[test]
    fn decay_constant_is_ln2_over_half_life() {
        let chain = DecayChain::rn220();
        let lambda = chain.decay_constants()[0];
        assert!((lambda - std::f64::consts::LN_2 / 55.6).abs() < 1e-15);
        assert!((chain.mean_lifetimes()[0] * lambda - 1.0).abs() < 1e-12);
    }

    #[test]
    fn alpha_flags_follow_chain_definitions() {
        assert_eq!(DecayChain::rn222().alpha_weights(), vec![1.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(DecayChain::rn220().alpha_weights(), vec![1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn fixed_chains_have_distinct_rates() {
        for chain in [DecayChain::rn222(), DecayChain::rn220()] {
            let rates = chain.decay_constants();
            for i in 0..rates.len() {
                for j in (i + 1)..rates.len() {
                    assert_ne!(rates[i], rates[j], "{} stages {i} and {j} collide", chain.name);
                }
            }
        }
    }
}
