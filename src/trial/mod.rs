//! Trial orchestration.
//!
//! Responsibilities:
//!
//! - run one (sample_time, total_time) cell: bases, repeated simulate+regress,
//!   mean/std summary (`runner`)
//! - fan the sweep grid out over a bounded worker pool and fill the result
//!   arena (`scheduler`)

pub mod runner;
pub mod scheduler;

pub use runner::*;
pub use scheduler::*;
