//! Export the selected series set to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! one row per plotted point, in selected-set order.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::RegionSeries;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct SeriesRow<'a> {
    region: &'a str,
    /// Day index since the region crossed the threshold (the chart's X).
    index: usize,
    date: &'a str,
    daily: f64,
    total: f64,
}

/// Write `region,index,date,daily,total` rows for every plotted point.
pub fn write_series_csv(path: &Path, series: &[RegionSeries]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| {
        AppError::config(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    let mut rows = 0usize;
    for s in series {
        for (index, p) in s.points.iter().enumerate() {
            writer
                .serialize(SeriesRow {
                    region: &s.region,
                    index,
                    date: &p.date,
                    daily: p.daily,
                    total: p.total,
                })
                .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
            rows += 1;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to write export CSV: {e}")))?;
    info!("Exported {rows} rows to {}", path.display());
    Ok(())
}
