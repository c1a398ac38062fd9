//! Human-readable output: per-trial summary lines and end-of-run reports.

pub mod format;

pub use format::*;
