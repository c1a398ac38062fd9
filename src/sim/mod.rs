//! Stochastic simulation toolkit.
//!
//! - per-call random generators (`rng`)
//! - Monte-Carlo arrival histograms for a chain (`counts`)
//! - one-interval population stepping across stages (`state`)

pub mod counts;
pub mod rng;
pub mod state;

pub use counts::*;
pub use rng::*;
pub use state::*;
