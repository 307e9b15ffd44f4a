//! Shared fetch → decode → transform workflow used by both subcommands.
//!
//! Each run loads the sheet once and hands plain data to the presentation
//! code in `app`. The `*_with_records` variants skip the fetch so the
//! transform half can be driven from memory.

use std::time::Duration;

use tracing::info;

use crate::data::{Fetcher, read_records};
use crate::domain::{GrowthConfig, PlotConfig, Record, RegionSeries, Source};
use crate::error::AppError;
use crate::report::{GrowthRow, growth_rankings};
use crate::transform::{Schema, crop_window, group_all, resolve_schema, select_regions};

/// All computed outputs of a single `ecdc plot` run.
#[derive(Debug, Clone)]
pub struct PlotRun {
    /// Selected set, one entry per requested region, cropped.
    pub series: Vec<RegionSeries>,
    pub schema: Schema,
    /// Threshold the series start at.
    pub min_y: f64,
    /// Length every series was truncated to, if the crop fired.
    pub crop: Option<usize>,
}

/// Fetch the sheet once and decode it into records.
pub fn fetch_records(source: &Source, timeout: Option<Duration>) -> Result<Vec<Record>, AppError> {
    let fetcher = Fetcher::new(timeout)?;
    let bytes = fetcher.fetch(source)?;
    let records = read_records(&bytes)?;
    info!("Decoded {} rows", records.len());
    Ok(records)
}

/// Execute the full plot pipeline.
pub fn run_plot(config: &PlotConfig) -> Result<PlotRun, AppError> {
    let records = fetch_records(&config.source, config.timeout)?;
    run_plot_with_records(config, &records)
}

/// Plot pipeline over already decoded records.
pub fn run_plot_with_records(config: &PlotConfig, records: &[Record]) -> Result<PlotRun, AppError> {
    let schema = resolve_schema(records, config.metric, config.normalize)?;
    let min_y = config.min_y(schema.normalize);

    let mut series = select_regions(records, &schema.keys, min_y, &config.regions, schema.normalize)?;
    let crop = crop_window(&mut series, config.crop);

    Ok(PlotRun {
        series,
        schema,
        min_y,
        crop,
    })
}

/// Execute the full growth-ranking pipeline.
pub fn run_growth(config: &GrowthConfig) -> Result<Vec<GrowthRow>, AppError> {
    let records = fetch_records(&config.source, config.timeout)?;
    run_growth_with_records(config, &records)
}

/// Growth ranking over already decoded records.
pub fn run_growth_with_records(
    config: &GrowthConfig,
    records: &[Record],
) -> Result<Vec<GrowthRow>, AppError> {
    let schema = resolve_schema(records, config.metric, false)?;
    let groups = group_all(records, &schema.keys)?;
    let rows = growth_rankings(&groups, config);
    info!("Ranked {} of {} regions", rows.len(), groups.len());
    Ok(rows)
}
