//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the two fixed decay chains (`DecayChain`, `ChainPair`)
//! - sweep grid parameters and trial cells (`GridAxis`, `SweepGrid`, `TrialCell`)
//! - per-trial settings and outputs (`TrialSettings`, `TrialOutcome`, `ResultGrids`)

pub mod chain;
pub mod types;

pub use chain::*;
pub use types::*;
