//! Command-line parsing for the ECDC chart and growth tools.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pipeline: `app` converts these structs into plain config before anything runs.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "ecdc",
    version,
    about = "COVID-19 growth charts from the ECDC spreadsheet"
)]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plot cumulative counts per country on a log scale with doubling-time lines.
    Plot(PlotArgs),
    /// Print countries ranked by average daily growth over the last days (TSV).
    Growth(GrowthArgs),
}

/// Options shared by every subcommand: where the sheet comes from and what to count.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Spreadsheet URL or local path. Defaults to the dated ECDC download.
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    /// Metric to count: `deaths` (any case) selects deaths, anything else cases.
    #[arg(long, value_name = "KEY")]
    pub key: Option<String>,

    /// Count deaths instead of cases (same as `--key deaths`).
    #[arg(short = 'd', long)]
    pub deaths: bool,

    /// Date of the ECDC download when no SOURCE is given (default: today).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Request timeout in seconds (default: wait indefinitely).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,
}

/// Options for the chart.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Normalize counts per million inhabitants (needs population data).
    #[arg(short = 'n', long)]
    pub normalize: bool,

    /// Threshold a series starts at (default: 100 cases / 10 deaths).
    #[arg(short = 's', long, value_name = "S")]
    pub start: Option<f64>,

    /// Comma-separated region codes to plot, in legend order.
    #[arg(long, value_delimiter = ',', value_name = "CODES")]
    pub countries: Vec<String>,

    /// Days kept past the second-longest series before cropping.
    #[arg(long, default_value_t = crate::domain::DEFAULT_CROP_PADDING, value_name = "N")]
    pub crop_padding: usize,

    /// Keep every series at full length.
    #[arg(long)]
    pub no_crop: bool,

    /// Output SVG path (default: covid-19-{metric}-ecdc[-normalized][-DATE].svg).
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Append today's date to the default output name.
    #[arg(short = 't', long)]
    pub timestamp: bool,

    /// Chart width (pixels).
    #[arg(long, default_value_t = 640)]
    pub width: u32,

    /// Chart height (pixels).
    #[arg(long, default_value_t = 480)]
    pub height: u32,

    /// Also print an ASCII preview of the chart.
    #[arg(long)]
    pub ascii: bool,

    /// ASCII preview width (columns).
    #[arg(long, default_value_t = 100)]
    pub ascii_width: usize,

    /// ASCII preview height (rows).
    #[arg(long, default_value_t = 25)]
    pub ascii_height: usize,

    /// Export the plotted series to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Options for the growth ranking.
#[derive(Debug, Args, Clone)]
pub struct GrowthArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of trailing days in the regression window.
    #[arg(long, default_value_t = 5, value_name = "N")]
    pub days: usize,

    /// Minimum latest total to be ranked (default: 500 cases / 20 deaths).
    #[arg(long, value_name = "T")]
    pub threshold: Option<f64>,

    /// Region codes never ranked.
    #[arg(long, value_delimiter = ',', default_value = "JPG11668", value_name = "CODES")]
    pub exclude: Vec<String>,
}
