//! Mathematical utilities: analytic chain response, least squares, summary stats.

pub mod basis;
pub mod ols;
pub mod stats;

pub use basis::*;
pub use ols::*;
pub use stats::*;
