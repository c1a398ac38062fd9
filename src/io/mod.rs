//! Output writers.
//!
//! - result grids as headerless CSV tables (`export`)
//! - run summary JSON (`summary`)

pub mod export;
pub mod summary;

pub use export::*;
pub use summary::*;
