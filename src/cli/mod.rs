//! Command-line parsing for the radon sweep.
//!
//! The goal of this module is to keep argument parsing and command dispatch
//! separate from the simulation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::DetectionMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "radon", version, about = "Monte-Carlo Rn-222 / Rn-220 activity estimator")]
pub struct Cli {
    /// Increase verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full (sample time x total time) sweep and write the result grids.
    Sweep(SweepArgs),
    /// Run a single trial cell and print its summary.
    Trial(TrialArgs),
    /// Print a chain's analytic per-bin response.
    Basis(BasisArgs),
    /// Advance a stage population by one interval.
    Step(StepArgs),
}

/// Which chain a single-chain command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChainChoice {
    Rn222,
    Rn220,
}

/// Per-trial knobs shared by `sweep` and `trial`.
#[derive(Debug, Args, Clone)]
pub struct TrialOpts {
    /// Rn-222 source atoms simulated per repeat.
    #[arg(long, default_value_t = crate::domain::DEFAULT_RN222_ATOMS)]
    pub rn222_atoms: usize,

    /// Rn-220 source atoms simulated per repeat.
    #[arg(long, default_value_t = crate::domain::DEFAULT_RN220_ATOMS)]
    pub rn220_atoms: usize,

    /// Simulate+regress repeats per cell.
    #[arg(long, default_value_t = crate::domain::DEFAULT_REPEATS)]
    pub repeats: usize,

    /// Which stages the detector counts.
    #[arg(long, value_enum, default_value_t = DetectionMode::AllStages)]
    pub detection: DetectionMode,

    /// Base RNG seed for reproducible runs (default: OS entropy).
    #[arg(long, env = "RADON_SEED")]
    pub seed: Option<u64>,
}

/// Options for the grid sweep.
#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    /// First sample time (s). The sample axis is anchored at its step.
    #[arg(long, default_value_t = 1)]
    pub sample_start: u64,

    /// Sample-time increment (s).
    #[arg(long, default_value_t = 1)]
    pub sample_step: u64,

    /// Number of sample times.
    #[arg(long, default_value_t = 60)]
    pub sample_count: usize,

    /// First total observation time (s).
    #[arg(long, default_value_t = 60)]
    pub total_start: u64,

    /// Total-time increment (s).
    #[arg(long, default_value_t = 60)]
    pub total_step: u64,

    /// Number of total times.
    #[arg(long, default_value_t = 1)]
    pub total_count: usize,

    /// Concurrent trials (default: available processing units).
    #[arg(short = 'j', long, env = "RADON_THREADS")]
    pub threads: Option<usize>,

    /// Directory for the CSV grids and summary.
    #[arg(short, long, env = "RADON_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Skip writing summary.json.
    #[arg(long)]
    pub no_summary: bool,

    #[command(flatten)]
    pub trial: TrialOpts,
}

/// Options for a single trial cell.
#[derive(Debug, Args, Clone)]
pub struct TrialArgs {
    /// Bin width (s).
    #[arg(long, default_value_t = 10)]
    pub sample_time: u64,

    /// Observation window (s).
    #[arg(long, default_value_t = 600)]
    pub total_time: u64,

    #[command(flatten)]
    pub trial: TrialOpts,
}

/// Options for printing a basis.
#[derive(Debug, Args, Clone)]
pub struct BasisArgs {
    #[arg(long, value_enum, default_value_t = ChainChoice::Rn222)]
    pub chain: ChainChoice,

    /// Bin width (s).
    #[arg(long, default_value_t = 10.0)]
    pub sample_time: f64,

    /// Number of bins.
    #[arg(long, default_value_t = 30)]
    pub bins: usize,

    /// Weight only alpha-emitting stages.
    #[arg(long)]
    pub alpha_only: bool,
}

/// Options for one state step.
#[derive(Debug, Args, Clone)]
pub struct StepArgs {
    #[arg(long, value_enum, default_value_t = ChainChoice::Rn220)]
    pub chain: ChainChoice,

    /// Atoms per stage, comma-separated, parent first.
    #[arg(long, value_delimiter = ',', required = true)]
    pub state: Vec<u64>,

    /// Interval length (s).
    #[arg(long, default_value_t = 60.0)]
    pub interval: f64,

    /// Weight only alpha-emitting stages.
    #[arg(long)]
    pub alpha_only: bool,

    #[arg(long, env = "RADON_SEED")]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_defaults_match_driver_grid() {
        let cli = Cli::parse_from(["radon", "sweep"]);
        let Command::Sweep(args) = cli.command else {
            panic!("expected sweep");
        };
        assert_eq!((args.sample_start, args.sample_step, args.sample_count), (1, 1, 60));
        assert_eq!((args.total_start, args.total_step, args.total_count), (60, 60, 1));
        assert_eq!(args.trial.repeats, 10);
        assert_eq!(args.trial.rn220_atoms, 166);
    }

    #[test]
    fn step_parses_comma_separated_state() {
        let cli = Cli::parse_from(["radon", "step", "--state", "10,0,0,0", "--interval", "5"]);
        let Command::Step(args) = cli.command else {
            panic!("expected step");
        };
        assert_eq!(args.state, vec![10, 0, 0, 0]);
        assert_eq!(args.interval, 5.0);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
