//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw spreadsheet records (`Record`, `Cell`)
//! - schema key sets and the selected metric (`SchemaKeys`, `Metric`)
//! - per-region cumulative series (`SeriesPoint`, `RegionSeries`)
//! - run configuration (`PlotConfig`, `GrowthConfig`, `CropPolicy`)

pub mod types;

pub use types::*;
