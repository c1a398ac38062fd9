//! `radon-mc` library crate.
//!
//! Estimates Rn-222 / Rn-220 activity from simulated detector counts by
//! repeated Monte-Carlo trials and no-intercept regression against analytic
//! per-bin responses.
//!
//! The binary (`radon`) is a thin wrapper around this library so that the
//! simulation and estimation core is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod math;
pub mod report;
pub mod sim;
pub mod trial;
