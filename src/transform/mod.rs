//! Records → per-region cumulative series.
//!
//! Everything here is a pure function of its inputs:
//!
//! - `schema`: pick the key set matching the sheet's header revision
//! - `select`: group rows by region, accumulate, apply the threshold
//! - `crop`: bound the shared time axis

pub mod crop;
pub mod schema;
pub mod select;

use thiserror::Error;

pub use crop::crop_window;
pub use schema::{Schema, resolve_schema};
pub use select::{group_all, iso_date, select_regions};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("Unrecognized spreadsheet schema: expected a `geoId` or `GeoId` column.")]
    UnknownSchema,
    #[error("Sheet line {line} is missing field `{field}`.")]
    MissingField { line: usize, field: String },
    #[error("Sheet line {line} has a non-numeric or out-of-range `{field}`.")]
    NotNumeric { line: usize, field: String },
}
