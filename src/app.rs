//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` overrides and parses CLI arguments
//! - initializes logging
//! - dispatches to the sweep / single-trial / basis / step commands
//! - prints reports

use clap::Parser;
use rand::Rng;

use crate::cli::{BasisArgs, ChainChoice, Command, StepArgs, SweepArgs, TrialArgs, TrialOpts};
use crate::domain::{ChainPair, DecayChain, GridAxis, SweepGrid, TrialCell, TrialSettings};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `radon` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is normal; only the variables clap reads matter.
    let _ = dotenvy::dotenv();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init(cli.verbose);

    match cli.command {
        Command::Sweep(args) => handle_sweep(args),
        Command::Trial(args) => handle_trial(args),
        Command::Basis(args) => handle_basis(args),
        Command::Step(args) => handle_step(args),
    }
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let config = sweep_config_from_args(&args);
    let run = pipeline::run_sweep(&config)?;
    println!(
        "{}",
        crate::report::format_sweep_summary(
            &config.grid,
            &config.settings,
            config.threads,
            &run.output,
            run.elapsed
        )
    );
    for path in &run.written {
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn handle_trial(args: TrialArgs) -> Result<(), AppError> {
    let settings = settings_from_opts(&args.trial);
    settings.validate()?;
    let cell = TrialCell {
        index: 0,
        sample_time: args.sample_time,
        total_time: args.total_time,
        row: 0,
        col: 0,
    };
    let outcome = crate::trial::run_trial(&ChainPair::default(), &settings, &cell)?;
    for line in crate::report::format_trial_lines(&cell, &outcome.stats) {
        println!("{line}");
    }
    Ok(())
}

fn handle_basis(args: BasisArgs) -> Result<(), AppError> {
    let chain = chain_for(args.chain);
    let weights = args.alpha_only.then(|| chain.alpha_weights());
    let basis = crate::math::analytic_basis(
        args.sample_time,
        args.bins,
        &chain.decay_constants(),
        weights.as_deref(),
    )?;
    print!("{}", crate::report::format_basis(&chain, args.sample_time, &basis));
    Ok(())
}

fn handle_step(args: StepArgs) -> Result<(), AppError> {
    let chain = chain_for(args.chain);
    let weights = args.alpha_only.then(|| chain.alpha_weights());
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().r#gen());
    let mut rng = crate::sim::call_rng(Some(seed), 0);
    let step = crate::sim::step_state(
        &mut rng,
        &args.state,
        args.interval,
        &chain.decay_constants(),
        weights.as_deref(),
    )?;
    print!("{}", crate::report::format_step(&chain, &args.state, &step));
    Ok(())
}

fn chain_for(choice: ChainChoice) -> DecayChain {
    match choice {
        ChainChoice::Rn222 => DecayChain::rn222(),
        ChainChoice::Rn220 => DecayChain::rn220(),
    }
}

pub fn settings_from_opts(opts: &TrialOpts) -> TrialSettings {
    TrialSettings {
        rn222_atoms: opts.rn222_atoms,
        rn220_atoms: opts.rn220_atoms,
        repeats: opts.repeats,
        detection: opts.detection,
        seed: opts.seed,
    }
}

pub fn sweep_config_from_args(args: &SweepArgs) -> pipeline::SweepConfig {
    pipeline::SweepConfig {
        grid: SweepGrid::new(
            GridAxis::new(args.sample_start, args.sample_step, args.sample_count),
            GridAxis::new(args.total_start, args.total_step, args.total_count),
        ),
        settings: settings_from_opts(&args.trial),
        threads: args
            .threads
            .unwrap_or_else(crate::trial::available_threads),
        output_dir: args.output_dir.clone(),
        write_summary: !args.no_summary,
    }
}

/// Rewrite argv so `radon` defaults to `radon sweep`.
///
/// Rules:
/// - `radon`                     -> `radon sweep`
/// - `radon --threads 4 ...`     -> `radon sweep --threads 4 ...`
/// - `radon --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("sweep".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "sweep" | "trial" | "basis" | "step");
    if is_subcommand {
        return argv;
    }

    // Leading verbosity flags are global; look past them for a subcommand.
    let first_non_verbose = argv[1..]
        .iter()
        .position(|a| !is_verbose_flag(a))
        .map(|p| p + 1);
    if let Some(pos) = first_non_verbose {
        if matches!(argv[pos].as_str(), "sweep" | "trial" | "basis" | "step") {
            return argv;
        }
    }

    if arg1.starts_with('-') {
        argv.insert(1, "sweep".to_string());
        return argv;
    }

    argv
}

fn is_verbose_flag(arg: &str) -> bool {
    arg == "--verbose" || (arg.starts_with("-v") && arg[1..].chars().all(|c| c == 'v'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_sweep() {
        assert_eq!(rewrite_args(argv(&["radon"])), argv(&["radon", "sweep"]));
    }

    #[test]
    fn leading_flags_are_sweep_flags() {
        assert_eq!(
            rewrite_args(argv(&["radon", "-j", "4"])),
            argv(&["radon", "sweep", "-j", "4"])
        );
    }

    #[test]
    fn explicit_subcommands_and_help_are_untouched() {
        assert_eq!(rewrite_args(argv(&["radon", "trial"])), argv(&["radon", "trial"]));
        assert_eq!(rewrite_args(argv(&["radon", "--help"])), argv(&["radon", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["radon", "-vv", "basis"])),
            argv(&["radon", "-vv", "basis"])
        );
    }

    #[test]
    fn sweep_config_uses_requested_threads() {
        let cli = crate::cli::Cli::parse_from(["radon", "sweep", "-j", "3", "--no-summary"]);
        let Command::Sweep(args) = cli.command else {
            panic!("expected sweep");
        };
        let config = sweep_config_from_args(&args);
        assert_eq!(config.threads, 3);
        assert!(!config.write_summary);
        assert_eq!(config.grid, SweepGrid::default());
    }
}
