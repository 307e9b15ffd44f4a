//! Grouping and accumulation of per-region rows.
//!
//! Source rows come newest-first. For each region we collect `(date, count)` in
//! encounter order, walk that list backwards to get chronological order, and
//! keep a running total over the full history. The threshold is applied only
//! after accumulation, so totals always include the days that were dropped.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::domain::{Cell, Record, RegionSeries, SchemaKeys, SeriesPoint};
use crate::transform::TransformError;

/// ISO date string from spreadsheet date parts: `iso_date(2020, 3, 7) == "2020-03-07"`.
pub fn iso_date(year: i32, month: u32, day: u32) -> String {
    format!("{year}-{month:02}-{day:02}")
}

/// One parsed row belonging to a region.
#[derive(Debug, Clone)]
struct Observation {
    date: String,
    count: f64,
    /// Multiplier applied to counts (`1e6 / population` when normalizing).
    scale: f64,
}

/// Build the selected series set: one entry per `regions` member, in order.
///
/// A region without rows, or whose total never reaches `min_y`, yields an
/// empty series.
pub fn select_regions(
    records: &[Record],
    keys: &SchemaKeys,
    min_y: f64,
    regions: &[String],
    normalize: bool,
) -> Result<Vec<RegionSeries>, TransformError> {
    let wanted: HashSet<&str> = regions.iter().map(String::as_str).collect();
    let groups = group_rows(records, keys, normalize, |region| wanted.contains(region))?;

    let selected = regions
        .iter()
        .map(|region| {
            let points = groups
                .get(region)
                .map(|obs| drop_below(accumulate(obs), min_y))
                .unwrap_or_default();
            debug!("{region}: {} points at or above {min_y}", points.len());
            RegionSeries::new(region.clone(), points)
        })
        .collect();

    Ok(selected)
}

/// Accumulate every region in the sheet, keyed (and ordered) by region code.
/// No threshold is applied.
pub fn group_all(
    records: &[Record],
    keys: &SchemaKeys,
) -> Result<BTreeMap<String, Vec<SeriesPoint>>, TransformError> {
    let groups = group_rows(records, keys, false, |_| true)?;
    Ok(groups
        .into_iter()
        .map(|(region, obs)| (region, accumulate(&obs)))
        .collect())
}

fn group_rows<F>(
    records: &[Record],
    keys: &SchemaKeys,
    normalize: bool,
    include: F,
) -> Result<HashMap<String, Vec<Observation>>, TransformError>
where
    F: Fn(&str) -> bool,
{
    let mut groups: HashMap<String, Vec<Observation>> = HashMap::new();

    for (idx, record) in records.iter().enumerate() {
        // Rows built in memory count from line 2, under a header row.
        let line = record.line.unwrap_or(idx + 2);
        let region = field(record, keys.region, line)?.as_text();
        if !include(&region) {
            continue;
        }

        let year = integer(record, keys.year, line)?;
        let month = integer(record, keys.month, line)?;
        let day = integer(record, keys.day, line)?;
        let count = number(record, keys.count, line)?;

        let scale = match keys.population {
            Some(pop_key) if normalize => {
                let population = number(record, pop_key, line)?;
                if population <= 0.0 {
                    return Err(TransformError::NotNumeric {
                        line,
                        field: pop_key.to_string(),
                    });
                }
                1e6 / population
            }
            _ => 1.0,
        };

        let (Ok(year), Ok(month), Ok(day)) = (
            i32::try_from(year),
            u32::try_from(month),
            u32::try_from(day),
        ) else {
            return Err(TransformError::NotNumeric {
                line,
                field: format!("{}/{}/{}", keys.year, keys.month, keys.day),
            });
        };

        groups.entry(region).or_default().push(Observation {
            date: iso_date(year, month, day),
            count,
            scale,
        });
    }

    Ok(groups)
}

/// Chronological running totals for rows given newest-first.
fn accumulate(rows: &[Observation]) -> Vec<SeriesPoint> {
    let mut total = 0.0;
    rows.iter()
        .rev()
        .map(|obs| {
            total += obs.count;
            SeriesPoint::new(obs.date.clone(), obs.count * obs.scale, total * obs.scale)
        })
        .collect()
}

/// Drop everything before the first point at or above `min_y`.
fn drop_below(mut points: Vec<SeriesPoint>, min_y: f64) -> Vec<SeriesPoint> {
    match points.iter().position(|p| p.total >= min_y) {
        Some(first) => {
            points.drain(..first);
            points
        }
        None => Vec::new(),
    }
}

fn field<'a>(record: &'a Record, key: &str, line: usize) -> Result<&'a Cell, TransformError> {
    record.get(key).ok_or_else(|| TransformError::MissingField {
        line,
        field: key.to_string(),
    })
}

fn number(record: &Record, key: &str, line: usize) -> Result<f64, TransformError> {
    field(record, key, line)?
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TransformError::NotNumeric {
            line,
            field: key.to_string(),
        })
}

fn integer(record: &Record, key: &str, line: usize) -> Result<i64, TransformError> {
    let value = number(record, key, line)?;
    if value.fract() != 0.0 {
        return Err(TransformError::NotNumeric {
            line,
            field: key.to_string(),
        });
    }
    Ok(value as i64)
}
