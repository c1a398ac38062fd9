//! Bounded concurrent execution of a sweep grid.
//!
//! Every grid cell becomes one task on a dedicated rayon pool with exactly
//! `threads` workers, so at most `threads` trial bodies run at once and the
//! rest queue until a worker frees up.
//!
//! Results land in a pre-sized [`ResultGrids`] arena. Each task receives an
//! exclusive `&mut` to its own slot, so cells are written without locking and
//! nothing is read until every task has finished.

use std::num::NonZeroUsize;

use rayon::prelude::*;
use tracing::{error, info};

use crate::domain::{ResultGrids, SweepGrid, TrialCell, TrialOutcome};
use crate::error::AppError;

/// Number of processing units available to this process (at least 1).
pub fn available_threads() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Outputs of a completed sweep.
#[derive(Debug, Clone)]
pub struct SweepOutput {
    pub grids: ResultGrids,
    /// One outcome per cell, in flat-index order.
    pub outcomes: Vec<TrialOutcome>,
}

/// Runs grid cells with a fixed concurrency bound.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    threads: usize,
}

impl Scheduler {
    /// `threads` is clamped to at least 1.
    pub fn new(threads: usize) -> Self {
        Self {
            threads: threads.max(1),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `body` once per grid cell and collect the results.
    ///
    /// Every cell is attempted even if some fail. Failures are logged as they
    /// are joined; the first one (by cell index) is returned once all tasks
    /// have completed.
    pub fn run<F>(&self, grid: &SweepGrid, body: F) -> Result<SweepOutput, AppError>
    where
        F: Fn(&TrialCell) -> Result<TrialOutcome, AppError> + Sync,
    {
        grid.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("trial-worker-{i}"))
            .build()
            .map_err(|e| AppError::config(format!("Failed to start trial pool: {e}")))?;

        let mut grids = ResultGrids::for_grid(grid);
        let results: Vec<Result<TrialOutcome, AppError>> = pool.install(|| {
            grids
                .slots_mut()
                .par_iter_mut()
                .enumerate()
                .map(|(idx, slot)| -> Result<TrialOutcome, AppError> {
                    let cell = grid.cell(idx);
                    info!(trial = idx, st = cell.sample_time, tt = cell.total_time, "starting trial");
                    let outcome = body(&cell)?;
                    *slot = Some(outcome.stats);
                    Ok(outcome)
                })
                .collect()
        });

        let mut first_err = None;
        let mut outcomes = Vec::with_capacity(results.len());
        for (idx, result) in results.into_iter().enumerate() {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(trial = idx, "trial failed: {e}");
                    first_err.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }

        Ok(SweepOutput { grids, outcomes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CellStats, GridAxis};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn fake_outcome(cell: &TrialCell) -> TrialOutcome {
        let v = cell.index as f64 + 1.0;
        TrialOutcome {
            cell: *cell,
            bins: cell.bins(),
            estimates: vec![(v, v)],
            stats: CellStats {
                rn222_mean: v,
                rn222_std: v,
                rn220_mean: v,
                rn220_std: v,
                ratio_mean: 1.0,
                ratio_std: 0.0,
            },
        }
    }

    #[test]
    fn concurrency_never_exceeds_bound() {
        let grid = SweepGrid::default();
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let done = AtomicUsize::new(0);

        let out = Scheduler::new(4)
            .run(&grid, |cell| {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(3));
                active.fetch_sub(1, Ordering::SeqCst);
                done.fetch_add(1, Ordering::SeqCst);
                Ok(fake_outcome(cell))
            })
            .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 4);
        assert_eq!(done.load(Ordering::SeqCst), 60);
        assert_eq!(out.outcomes.len(), 60);
        assert!(out.grids.is_complete());
        for table in [
            out.grids.rn222_mean(),
            out.grids.rn222_std(),
            out.grids.rn220_mean(),
            out.grids.rn220_std(),
        ] {
            assert!(table.iter().flatten().all(|v| *v != 0.0));
        }
    }

    #[test]
    fn each_cell_lands_in_its_own_slot() {
        let grid = SweepGrid::new(GridAxis::new(1, 2, 3), GridAxis::new(10, 10, 4));
        let out = Scheduler::new(3).run(&grid, |cell| Ok(fake_outcome(cell))).unwrap();
        for (idx, outcome) in out.outcomes.iter().enumerate() {
            assert_eq!(outcome.cell.index, idx);
            let c = grid.cell(idx);
            let stored = out.grids.get(c.row, c.col).unwrap();
            assert_eq!(stored.rn222_mean, idx as f64 + 1.0);
        }
    }

    #[test]
    fn failing_cell_does_not_stop_the_others() {
        let grid = SweepGrid::new(GridAxis::new(1, 1, 5), GridAxis::new(60, 60, 2));
        let ran = AtomicUsize::new(0);
        let err = Scheduler::new(2)
            .run(&grid, |cell| {
                ran.fetch_add(1, Ordering::SeqCst);
                if cell.index == 3 || cell.index == 7 {
                    Err(AppError::numeric(format!("cell {} exploded", cell.index)))
                } else {
                    Ok(fake_outcome(cell))
                }
            })
            .unwrap_err();
        assert_eq!(ran.load(Ordering::SeqCst), 10);
        assert_eq!(err.message(), "cell 3 exploded");
    }

    #[test]
    fn zero_threads_is_clamped() {
        assert_eq!(Scheduler::new(0).threads(), 1);
        assert!(available_threads() >= 1);
    }
}
