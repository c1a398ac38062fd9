//! Formatted terminal output.
//!
//! We keep formatting code in one place so the simulation code stays clean and
//! output changes are localized.

use std::time::Duration;

use crate::domain::{CellStats, DecayChain, SweepGrid, TrialCell, TrialSettings};
use crate::sim::StepOutcome;
use crate::trial::SweepOutput;

/// The three summary lines emitted after each trial (Rn222, Rn220, ratio).
pub fn format_trial_lines(cell: &TrialCell, stats: &CellStats) -> [String; 3] {
    let st = cell.sample_time;
    let tt = cell.total_time;
    [
        format!(
            "st: {st}s, tt: {tt}s, Rn222 => mean: {:.1}, std: {:.1}",
            stats.rn222_mean, stats.rn222_std
        ),
        format!(
            "st: {st}s, tt: {tt}s, Rn220 => mean: {:.1}, std: {:.1}",
            stats.rn220_mean, stats.rn220_std
        ),
        format!(
            "st: {st}s, tt: {tt}s, ratio => mean: {:.1}, std: {:.1}",
            stats.ratio_mean, stats.ratio_std
        ),
    ]
}

/// End-of-sweep report: grid shape, settings, and a per-cell table.
pub fn format_sweep_summary(
    grid: &SweepGrid,
    settings: &TrialSettings,
    threads: usize,
    output: &SweepOutput,
    elapsed: Duration,
) -> String {
    let mut out = String::new();

    out.push_str("=== radon - two-chain activity sweep ===\n");
    out.push_str(&format!(
        "Grid: {} sample times x {} total times ({} cells) | threads={}\n",
        grid.rows(),
        grid.cols(),
        grid.len(),
        threads
    ));
    out.push_str(&format!(
        "Atoms: Rn222={} Rn220={} | repeats={} | detection={:?}\n",
        settings.rn222_atoms, settings.rn220_atoms, settings.repeats, settings.detection
    ));
    out.push_str(&format!("Elapsed: {:.2}s\n\n", elapsed.as_secs_f64()));

    out.push_str(&format!(
        "{:>6} {:>7} {:>5} {:>14} {:>12} {:>12} {:>10} {:>12} {:>10}\n",
        "st(s)", "tt(s)", "bins", "Rn222 mean", "Rn222 std", "Rn220 mean", "Rn220 std", "ratio mean", "ratio std"
    ));
    for o in &output.outcomes {
        let s = &o.stats;
        out.push_str(&format!(
            "{:>6} {:>7} {:>5} {:>14.1} {:>12.1} {:>12.1} {:>10.1} {:>12.1} {:>10.1}\n",
            o.cell.sample_time,
            o.cell.total_time,
            o.bins,
            s.rn222_mean,
            s.rn222_std,
            s.rn220_mean,
            s.rn220_std,
            s.ratio_mean,
            s.ratio_std
        ));
    }
    out
}

/// Two-column listing of a chain's analytic basis.
pub fn format_basis(chain: &DecayChain, bin_width: f64, basis: &[f64]) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {} basis, bin width {bin_width}s\n", chain.name));
    out.push_str(&format!("{:>6} {:>12} {:>18}\n", "bin", "t0(s)", "expected"));
    for (i, v) in basis.iter().enumerate() {
        out.push_str(&format!("{:>6} {:>12.1} {:>18.10e}\n", i, i as f64 * bin_width, v));
    }
    let total: f64 = basis.iter().sum();
    out.push_str(&format!("{:>6} {:>12} {:>18.10e}\n", "sum", "", total));
    out
}

/// Per-stage before/after table for one state step.
pub fn format_step(chain: &DecayChain, before: &[u64], step: &StepOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {} state step\n", chain.name));
    out.push_str(&format!("{:<8} {:>10} {:>12} {:>10}\n", "stage", "before", "decays", "after"));
    for (i, stage) in chain.stages().iter().enumerate() {
        out.push_str(&format!(
            "{:<8} {:>10} {:>12} {:>10}\n",
            stage.nuclide, before[i], step.transitions[i], step.state[i]
        ));
    }
    out.push_str(&format!("detections: {:.1}\n", step.detections));
    out
}
