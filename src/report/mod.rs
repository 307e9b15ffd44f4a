//! Reporting utilities: totals summary and growth ranking.
//!
//! Formatting lives here so the transform and plot code stay free of
//! presentation concerns.

pub mod format;
pub mod growth;

pub use format::format_totals;
pub use growth::{GrowthRow, growth_rankings, write_growth_tsv};
