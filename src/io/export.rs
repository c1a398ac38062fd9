//! Export the four result grids to CSV.
//!
//! Each file is a row-major table: one line per sample-time index, one
//! comma-separated value per total-time index, no header.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::domain::ResultGrids;
use crate::error::AppError;

pub const RN222_MEAN_FILE: &str = "rn222_mean.csv";
pub const RN222_STD_FILE: &str = "rn222_std.csv";
pub const RN220_MEAN_FILE: &str = "rn220_mean.csv";
pub const RN220_STD_FILE: &str = "rn220_std.csv";

/// Write one numeric table.
pub fn write_grid_csv(path: &Path, rows: &[Vec<f64>]) -> Result<(), AppError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_path(path)
        .map_err(|e| AppError::config(format!("Failed to create CSV '{}': {e}", path.display())))?;

    for row in rows {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .map_err(|e| AppError::config(format!("Failed to write CSV row to '{}': {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}

/// Write all four grids into `dir`, creating it if needed. Returns the paths written.
pub fn write_result_grids(dir: &Path, grids: &ResultGrids) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::config(format!("Failed to create output dir '{}': {e}", dir.display())))?;

    let tables = [
        (RN222_MEAN_FILE, grids.rn222_mean()),
        (RN222_STD_FILE, grids.rn222_std()),
        (RN220_MEAN_FILE, grids.rn220_mean()),
        (RN220_STD_FILE, grids.rn220_std()),
    ];

    let mut written = Vec::with_capacity(tables.len());
    for (name, rows) in tables {
        let path = dir.join(name);
        write_grid_csv(&path, &rows)?;
        written.push(path);
    }
    Ok(written)
}
