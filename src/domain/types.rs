//! Shared domain types.
//!
//! These types are intentionally plain data so they can be:
//!
//! - produced by the decoder and transformer without any I/O
//! - exported to CSV (`SeriesPoint` is `Serialize`)
//! - handed to the renderers as borrowed slices

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

/// Regions plotted when `--countries` is not given.
pub const DEFAULT_REGIONS: [&str; 8] = ["US", "DE", "IT", "FR", "ES", "CN", "KR", "JP"];

/// Days of grace past the second-longest series before cropping kicks in.
pub const DEFAULT_CROP_PADDING: usize = 5;

/// Threshold factor applied when counts are normalized per million inhabitants.
pub const NORMALIZED_THRESHOLD_FACTOR: f64 = 0.02;

/// A single spreadsheet cell value after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numeric view of the cell. Text cells are parsed leniently (trimmed).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Text view of the cell. Whole numbers print without a fraction.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) if v.fract() == 0.0 => format!("{}", *v as i64),
            Cell::Number(v) => v.to_string(),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// One flat spreadsheet row keyed by header name. Empty cells are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// 1-based sheet line the row was read from. Unknown for rows built in memory.
    pub line: Option<usize>,
    fields: HashMap<String, Cell>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_line(line: usize) -> Self {
        Self {
            line: Some(line),
            fields: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, cell: Cell) -> Option<Cell> {
        self.fields.insert(key.into(), cell)
    }

    pub fn remove(&mut self, key: &str) -> Option<Cell> {
        self.fields.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Cell)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Cell)>>(iter: I) -> Self {
        Self {
            line: None,
            fields: iter.into_iter().collect(),
        }
    }
}

/// Which metric to accumulate and plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cases,
    Deaths,
}

impl Metric {
    /// Resolve the `key` parameter: `deaths` (any case) selects deaths,
    /// anything else (or nothing) selects cases.
    pub fn from_key(key: Option<&str>) -> Self {
        match key {
            Some(k) if k.eq_ignore_ascii_case("deaths") => Metric::Deaths,
            _ => Metric::Cases,
        }
    }

    /// Minimum cumulative value at which a region's series starts.
    pub fn threshold(self) -> f64 {
        match self {
            Metric::Cases => 100.0,
            Metric::Deaths => 10.0,
        }
    }

    /// Minimum latest cumulative value for a region to enter the growth table.
    pub fn growth_threshold(self) -> f64 {
        match self {
            Metric::Cases => 500.0,
            Metric::Deaths => 20.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Cases => "cases",
            Metric::Deaths => "deaths",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Metric::Cases => "Cases",
            Metric::Deaths => "Deaths",
        }
    }
}

/// Field names of one spreadsheet schema revision.
///
/// The ECDC sheet switched from capitalized to camel-case headers on
/// 2020-03-27 and only the newer revision carries population data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaKeys {
    pub region: &'static str,
    pub year: &'static str,
    pub month: &'static str,
    pub day: &'static str,
    pub count: &'static str,
    pub population: Option<&'static str>,
}

impl SchemaKeys {
    pub fn lowercase(metric: Metric) -> Self {
        Self {
            region: "geoId",
            year: "year",
            month: "month",
            day: "day",
            count: match metric {
                Metric::Cases => "cases",
                Metric::Deaths => "deaths",
            },
            population: Some("popData2018"),
        }
    }

    pub fn capitalized(metric: Metric) -> Self {
        Self {
            region: "GeoId",
            year: "Year",
            month: "Month",
            day: "Day",
            count: match metric {
                Metric::Cases => "Cases",
                Metric::Deaths => "Deaths",
            },
            population: None,
        }
    }
}

/// One day of a region's series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    /// Count reported for this day.
    pub daily: f64,
    /// Running sum of `daily` over the region's full history up to this day.
    pub total: f64,
}

impl SeriesPoint {
    pub fn new(date: impl Into<String>, daily: f64, total: f64) -> Self {
        Self {
            date: date.into(),
            daily,
            total,
        }
    }
}

/// A region's chronological series (possibly empty).
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSeries {
    pub region: String,
    pub points: Vec<SeriesPoint>,
}

impl RegionSeries {
    pub fn new(region: impl Into<String>, points: Vec<SeriesPoint>) -> Self {
        Self {
            region: region.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_total(&self) -> Option<f64> {
        self.points.last().map(|p| p.total)
    }
}

/// Crop rule applied to the selected series set.
///
/// With `padding = Some(p)`, every series is truncated to
/// `second_longest + p` entries when the longest series exceeds that length.
/// `None` disables cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPolicy {
    pub padding: Option<usize>,
}

impl Default for CropPolicy {
    fn default() -> Self {
        Self {
            padding: Some(DEFAULT_CROP_PADDING),
        }
    }
}

/// Where the spreadsheet comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    /// Interpret a user-supplied location: `http(s)://` is a URL, anything else a path.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(raw.to_string())
        } else {
            Source::File(PathBuf::from(raw))
        }
    }

    /// The dated ECDC download under `base`.
    pub fn for_date(base: &str, date: NaiveDate) -> Self {
        Source::Url(format!(
            "{}/COVID-19-geographic-disbtribution-worldwide-{}.xlsx",
            base.trim_end_matches('/'),
            date.format("%Y-%m-%d")
        ))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{url}"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolved configuration for `ecdc plot`.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub source: Source,
    pub metric: Metric,
    /// Requested per-million normalization (may be dropped for old schemas).
    pub normalize: bool,
    /// Explicit threshold overriding the metric default.
    pub start: Option<f64>,
    pub regions: Vec<String>,
    pub crop: CropPolicy,
    pub timeout: Option<Duration>,
    /// Explicit output path; when `None` a name is derived from the run.
    pub output: Option<PathBuf>,
    /// Date appended to the derived output name (`--timestamp`).
    pub timestamp: Option<NaiveDate>,
    pub width: u32,
    pub height: u32,
    pub ascii: bool,
    pub ascii_width: usize,
    pub ascii_height: usize,
    pub export_series: Option<PathBuf>,
}

impl PlotConfig {
    /// Threshold for the run, after normalization has been resolved.
    pub fn min_y(&self, normalized: bool) -> f64 {
        if let Some(start) = self.start {
            return start;
        }
        let factor = if normalized {
            NORMALIZED_THRESHOLD_FACTOR
        } else {
            1.0
        };
        self.metric.threshold() * factor
    }

    /// Output file name: explicit `--output`, else
    /// `covid-19-{metric}-ecdc[-normalized][-DATE].svg`.
    pub fn output_path(&self, normalized: bool) -> PathBuf {
        if let Some(path) = &self.output {
            return path.clone();
        }
        let mut name = format!("covid-19-{}-ecdc", self.metric.label());
        if normalized {
            name.push_str("-normalized");
        }
        if let Some(date) = self.timestamp {
            name.push_str(&format!("-{date}"));
        }
        name.push_str(".svg");
        PathBuf::from(name)
    }

    /// Chart caption.
    pub fn title(&self, normalized: bool) -> String {
        let mut title = format!("Coronavirus Total {}", self.metric.title());
        if normalized {
            title.push_str(" Normalized (per Mio. Population)");
        }
        title
    }
}

/// Resolved configuration for `ecdc growth`.
#[derive(Debug, Clone)]
pub struct GrowthConfig {
    pub source: Source,
    pub metric: Metric,
    /// Number of trailing days in the regression window.
    pub days: usize,
    /// Minimum latest cumulative value; defaults to the metric's growth threshold.
    pub threshold: Option<f64>,
    /// Region codes never ranked.
    pub exclude: Vec<String>,
    pub timeout: Option<Duration>,
}

impl GrowthConfig {
    pub fn threshold(&self) -> f64 {
        self.threshold.unwrap_or_else(|| self.metric.growth_threshold())
    }
}
