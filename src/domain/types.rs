//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - handed to concurrent trial tasks by shared reference
//! - exported to CSV/JSON after the sweep completes

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default number of Rn-222 source atoms simulated per repeat.
pub const DEFAULT_RN222_ATOMS: usize = 1_000_000;
/// Default number of Rn-220 source atoms simulated per repeat (⌊1000/6⌋).
pub const DEFAULT_RN220_ATOMS: usize = 1000 / 6;
/// Default number of simulate+regress repeats per trial cell.
pub const DEFAULT_REPEATS: usize = 10;

/// One axis of the sweep grid, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridAxis {
    pub start: u64,
    pub step: u64,
    pub count: usize,
}

impl GridAxis {
    pub fn new(start: u64, step: u64, count: usize) -> Self {
        Self { start, step, count }
    }
}

/// Which stages contribute detections, in both the basis and the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMode {
    /// Every stage decay is counted.
    #[default]
    AllStages,
    /// Only alpha-emitting stages are counted.
    AlphaOnly,
}

/// A single point of the parameter sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialCell {
    /// Flat cell index in `[0, rows * cols)`.
    pub index: usize,
    /// Bin width (s).
    pub sample_time: u64,
    /// Observation window (s).
    pub total_time: u64,
    /// Sample-time index.
    pub row: usize,
    /// Total-time index.
    pub col: usize,
}

impl TrialCell {
    /// Number of whole bins in the observation window.
    pub fn bins(&self) -> usize {
        if self.sample_time == 0 {
            return 0;
        }
        (self.total_time / self.sample_time) as usize
    }
}

/// The (sample_time × total_time) sweep.
///
/// Rows index the sample-time axis and vary fastest in the flat index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepGrid {
    pub sample: GridAxis,
    pub total: GridAxis,
}

impl SweepGrid {
    pub fn new(sample: GridAxis, total: GridAxis) -> Self {
        Self { sample, total }
    }

    pub fn rows(&self) -> usize {
        self.sample.count
    }

    pub fn cols(&self) -> usize {
        self.total.count
    }

    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map a flat index to its cell.
    ///
    /// `row = idx % rows`, `col = idx / rows`,
    /// `sample_time = row·step + step`, `total_time = col·step + start`.
    /// The sample axis is anchored at its step, not its start.
    ///
    /// # Panics
    /// Panics if the grid has no rows.
    pub fn cell(&self, index: usize) -> TrialCell {
        let rows = self.rows();
        let row = index % rows;
        let col = index / rows;
        TrialCell {
            index,
            sample_time: row as u64 * self.sample.step + self.sample.step,
            total_time: col as u64 * self.total.step + self.total.start,
            row,
            col,
        }
    }

    /// Flat index of `(row, col)`.
    pub fn index_of(&self, row: usize, col: usize) -> usize {
        col * self.rows() + row
    }

    pub fn cells(&self) -> Vec<TrialCell> {
        (0..self.len()).map(|i| self.cell(i)).collect()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.sample.count == 0 || self.total.count == 0 {
            return Err(AppError::config("Grid axes must each have at least one point."));
        }
        if self.sample.step == 0 {
            return Err(AppError::config("Sample-time step must be > 0 s."));
        }
        if self.total.start == 0 && self.total.step == 0 {
            return Err(AppError::config("Total-time axis must not be constantly zero."));
        }
        // Largest sample time is count·step; largest total time is (count−1)·step + start.
        let max_sample = (self.sample.count as u64).checked_mul(self.sample.step);
        let max_total = (self.total.count as u64 - 1)
            .checked_mul(self.total.step)
            .and_then(|t| t.checked_add(self.total.start));
        if max_sample.is_none() || max_total.is_none() {
            return Err(AppError::config("Grid axis end does not fit in u64 seconds."));
        }
        Ok(())
    }
}

impl Default for SweepGrid {
    fn default() -> Self {
        Self {
            sample: GridAxis::new(1, 1, 60),
            total: GridAxis::new(60, 60, 1),
        }
    }
}

/// Knobs for a single trial cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialSettings {
    pub rn222_atoms: usize,
    pub rn220_atoms: usize,
    pub repeats: usize,
    pub detection: DetectionMode,
    /// Base seed. `None` draws every generator from OS entropy.
    pub seed: Option<u64>,
}

impl TrialSettings {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.repeats == 0 {
            return Err(AppError::config("Repeats must be > 0."));
        }
        if self.rn222_atoms == 0 && self.rn220_atoms == 0 {
            return Err(AppError::config("At least one chain needs a non-zero atom count."));
        }
        Ok(())
    }
}

impl Default for TrialSettings {
    fn default() -> Self {
        Self {
            rn222_atoms: DEFAULT_RN222_ATOMS,
            rn220_atoms: DEFAULT_RN220_ATOMS,
            repeats: DEFAULT_REPEATS,
            detection: DetectionMode::AllStages,
            seed: None,
        }
    }
}

/// Mean/std summary of one trial cell's repeated estimates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CellStats {
    pub rn222_mean: f64,
    pub rn222_std: f64,
    pub rn220_mean: f64,
    pub rn220_std: f64,
    pub ratio_mean: f64,
    pub ratio_std: f64,
}

/// Everything one trial produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialOutcome {
    pub cell: TrialCell,
    pub bins: usize,
    /// Per-repeat `(rn222, rn220)` coefficients.
    pub estimates: Vec<(f64, f64)>,
    pub stats: CellStats,
}

/// Pre-sized result arena, one slot per grid cell.
///
/// Slots are stored in flat-index order (rows fastest) so a scheduler can hand
/// each task an exclusive `&mut` to its own slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultGrids {
    rows: usize,
    cols: usize,
    cells: Vec<Option<CellStats>>,
}

impl ResultGrids {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn for_grid(grid: &SweepGrid) -> Self {
        Self::new(grid.rows(), grid.cols())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&CellStats> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(col * self.rows + row)?.as_ref()
    }

    pub fn slots_mut(&mut self) -> &mut [Option<CellStats>] {
        &mut self.cells
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn rn222_mean(&self) -> Vec<Vec<f64>> {
        self.table(|s| s.rn222_mean)
    }

    pub fn rn222_std(&self) -> Vec<Vec<f64>> {
        self.table(|s| s.rn222_std)
    }

    pub fn rn220_mean(&self) -> Vec<Vec<f64>> {
        self.table(|s| s.rn220_mean)
    }

    pub fn rn220_std(&self) -> Vec<Vec<f64>> {
        self.table(|s| s.rn220_std)
    }

    /// Row-major table of one statistic; empty slots read as 0.
    fn table(&self, field: impl Fn(&CellStats) -> f64) -> Vec<Vec<f64>> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| self.get(row, col).map(&field).unwrap_or(0.0))
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn default_grid_matches_driver() {
        let grid = SweepGrid::default();
        assert_eq!(grid.len(), 60);

        let first = grid.cell(0);
        assert_eq!((first.sample_time, first.total_time), (1, 60));
        assert_eq!(first.bins(), 60);

        let last = grid.cell(59);
        assert_eq!((last.row, last.col), (59, 0));
        assert_eq!((last.sample_time, last.total_time), (60, 60));
        assert_eq!(last.bins(), 1);
    }

    #[test]
    fn rows_vary_fastest() {
        let grid = SweepGrid::new(GridAxis::new(1, 5, 3), GridAxis::new(100, 50, 2));
        let c = grid.cell(4);
        assert_eq!((c.row, c.col), (1, 1));
        assert_eq!(c.sample_time, 10);
        assert_eq!(c.total_time, 150);
        assert_eq!(grid.index_of(1, 1), 4);
    }

    #[test]
    fn validate_rejects_degenerate_axes() {
        let zero_step = SweepGrid::new(GridAxis::new(1, 0, 3), GridAxis::new(60, 60, 1));
        assert!(zero_step.validate().is_err());
        let no_cols = SweepGrid::new(GridAxis::new(1, 1, 3), GridAxis::new(60, 60, 0));
        assert!(no_cols.validate().is_err());
        assert!(SweepGrid::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_axes_that_overflow() {
        let huge_sample = SweepGrid::new(GridAxis::new(1, u64::MAX / 2, 3), GridAxis::new(60, 60, 1));
        assert_eq!(huge_sample.validate().unwrap_err().exit_code(), 2);
        let huge_total = SweepGrid::new(GridAxis::new(1, 1, 1), GridAxis::new(u64::MAX, 1, 2));
        assert_eq!(huge_total.validate().unwrap_err().exit_code(), 2);
        let edge = SweepGrid::new(GridAxis::new(1, 1, 1), GridAxis::new(u64::MAX, 1, 1));
        assert!(edge.validate().is_ok());
        assert_eq!(edge.cell(0).total_time, u64::MAX);
    }

    #[test]
    fn default_settings_use_driver_constants() {
        let s = TrialSettings::default();
        assert_eq!(s.rn222_atoms, 1_000_000);
        assert_eq!(s.rn220_atoms, 166);
        assert_eq!(s.repeats, 10);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn tables_are_row_major_by_sample_index() {
        let grid = SweepGrid::new(GridAxis::new(1, 1, 2), GridAxis::new(10, 10, 3));
        let mut grids = ResultGrids::for_grid(&grid);
        for (idx, slot) in grids.slots_mut().iter_mut().enumerate() {
            *slot = Some(CellStats {
                rn222_mean: idx as f64,
                ..CellStats::default()
            });
        }
        assert!(grids.is_complete());
        let table = grids.rn222_mean();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0], vec![0.0, 2.0, 4.0]);
        assert_eq!(table[1], vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn empty_slots_read_as_zero() {
        let grids = ResultGrids::new(2, 2);
        assert!(!grids.is_complete());
        assert_eq!(grids.rn220_std(), vec![vec![0.0, 0.0], vec![0.0, 0.0]]);
    }

    proptest! {
        #[test]
        fn cell_mapping_is_bijective(rows in 1usize..40, cols in 1usize..40) {
            let grid = SweepGrid::new(GridAxis::new(1, 1, rows), GridAxis::new(60, 60, cols));
            let mut seen = HashSet::new();
            for idx in 0..grid.len() {
                let c = grid.cell(idx);
                prop_assert!(c.row < rows && c.col < cols);
                prop_assert_eq!(grid.index_of(c.row, c.col), idx);
                prop_assert!(seen.insert((c.row, c.col)));
            }
            prop_assert_eq!(seen.len(), rows * cols);
        }
    }
}
