//! Shared sweep pipeline.
//!
//! validate config -> build chains -> bounded concurrent trials -> join ->
//! persist grids (+ summary)
//!
//! The CLI only handles presentation; everything that touches the result
//! grids lives here.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::info;

use crate::domain::{ChainPair, SweepGrid, TrialSettings};
use crate::error::AppError;
use crate::io::{RunSummary, SUMMARY_FILE, write_result_grids, write_summary_json};
use crate::trial::{Scheduler, SweepOutput, run_trial};

/// Validated inputs of a sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub grid: SweepGrid,
    pub settings: TrialSettings,
    /// Concurrency bound (max trial bodies executing at once).
    pub threads: usize,
    pub output_dir: PathBuf,
    pub write_summary: bool,
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        self.grid.validate()?;
        self.settings.validate()?;
        if self.threads == 0 {
            return Err(AppError::config("Thread count must be > 0."));
        }
        Ok(())
    }
}

/// All computed outputs of a single sweep.
#[derive(Debug, Clone)]
pub struct SweepRun {
    pub output: SweepOutput,
    pub elapsed: Duration,
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
}

/// Execute the full sweep and persist its grids.
pub fn run_sweep(config: &SweepConfig) -> Result<SweepRun, AppError> {
    config.validate()?;

    let chains = ChainPair::default();
    let scheduler = Scheduler::new(config.threads);
    info!(
        cells = config.grid.len(),
        threads = scheduler.threads(),
        "starting sweep"
    );

    let started = Instant::now();
    let output = scheduler.run(&config.grid, |cell| run_trial(&chains, &config.settings, cell))?;
    let elapsed = started.elapsed();

    let mut written = write_result_grids(&config.output_dir, &output.grids)?;
    if config.write_summary {
        let summary = RunSummary::from_output(
            &config.grid,
            &config.settings,
            scheduler.threads(),
            elapsed.as_secs_f64(),
            &output,
        );
        let path = config.output_dir.join(SUMMARY_FILE);
        write_summary_json(&path, &summary)?;
        written.push(path);
    }
    info!(elapsed_secs = elapsed.as_secs_f64(), "sweep complete");

    Ok(SweepRun {
        output,
        elapsed,
        written,
    })
}
