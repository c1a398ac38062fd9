//! Run summary JSON.
//!
//! The CSV grids carry only the four headline statistics. The summary keeps
//! everything needed to interpret them later: when the sweep ran, its grid and
//! trial settings, and per-cell stats including the Rn222/Rn220 ratio.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{CellStats, SweepGrid, TrialCell, TrialSettings};
use crate::error::AppError;
use crate::trial::SweepOutput;

pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub grid: SweepGrid,
    pub settings: TrialSettings,
    pub threads: usize,
    pub elapsed_secs: f64,
    pub cells: Vec<CellSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CellSummary {
    #[serde(flatten)]
    pub cell: TrialCell,
    pub bins: usize,
    #[serde(flatten)]
    pub stats: CellStats,
}

impl RunSummary {
    pub fn from_output(
        grid: &SweepGrid,
        settings: &TrialSettings,
        threads: usize,
        elapsed_secs: f64,
        output: &SweepOutput,
    ) -> Self {
        Self {
            tool: "radon".to_string(),
            generated_at: Utc::now(),
            grid: *grid,
            settings: *settings,
            threads,
            elapsed_secs,
            cells: output
                .outcomes
                .iter()
                .map(|o| CellSummary {
                    cell: o.cell,
                    bins: o.bins,
                    stats: o.stats,
                })
                .collect(),
        }
    }
}

/// Write the summary as pretty JSON.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::config(format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}
