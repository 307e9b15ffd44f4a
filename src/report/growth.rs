//! Growth ranking: average daily growth of every region over the last N days.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{GrowthConfig, SeriesPoint};
use crate::error::AppError;
use crate::math::log_linear_growth;

/// One ranked region.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthRow {
    pub region: String,
    /// ISO dates of the window, oldest first.
    pub dates: Vec<String>,
    /// Cumulative totals over the window.
    pub totals: Vec<f64>,
    /// Daily growth factor (`1.25` = +25% per day).
    pub growth: f64,
}

impl GrowthRow {
    /// Growth as a whole percent: `1.25 → "25%"`.
    pub fn percent(&self) -> String {
        format!("{:.0}%", 100.0 * (self.growth - 1.0))
    }
}

/// Rank every eligible region by its daily growth factor, fastest first.
///
/// A region is skipped when it is excluded, has fewer than `days` points, had
/// a zero total at the start of the window, or ends below the threshold.
pub fn growth_rankings(
    groups: &BTreeMap<String, Vec<SeriesPoint>>,
    config: &GrowthConfig,
) -> Vec<GrowthRow> {
    let days = config.days;
    let threshold = config.threshold();

    let mut rows: Vec<GrowthRow> = groups
        .iter()
        .filter(|(region, _)| !config.exclude.iter().any(|x| x == *region))
        .filter_map(|(region, points)| {
            if days < 2 || points.len() < days {
                return None;
            }
            let window = &points[points.len() - days..];
            if window[0].total == 0.0 || window[days - 1].total < threshold {
                return None;
            }
            let totals: Vec<f64> = window.iter().map(|p| p.total).collect();
            let Some(growth) = log_linear_growth(&totals) else {
                debug!("{region}: no growth fit over {days} days");
                return None;
            };
            Some(GrowthRow {
                region: region.clone(),
                dates: window.iter().map(|p| p.date.clone()).collect(),
                totals,
                growth,
            })
        })
        .collect();

    rows.sort_by(|a, b| b.growth.total_cmp(&a.growth));
    rows
}

/// Write the ranking as a tab-separated table: `ID`, one `MM/DD` column per
/// day of the window, `Daily`.
pub fn write_growth_tsv<W: Write>(rows: &[GrowthRow], out: W) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);

    let mut header = vec!["ID".to_string()];
    if let Some(first) = rows.first() {
        header.extend(first.dates.iter().map(|d| month_day(d)));
    }
    header.push("Daily".to_string());
    writer.write_record(&header).map_err(tsv_error)?;

    for row in rows {
        let mut record = vec![row.region.clone()];
        record.extend(row.totals.iter().map(|t| format!("{t:.0}")));
        record.push(row.percent());
        writer.write_record(&record).map_err(tsv_error)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Failed to write growth table: {e}")))
}

fn month_day(iso: &str) -> String {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .map(|d| d.format("%m/%d").to_string())
        .unwrap_or_else(|_| iso.to_string())
}

fn tsv_error(err: csv::Error) -> AppError {
    AppError::config(format!("Failed to write growth table: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Metric, Source};

    fn config(days: usize) -> GrowthConfig {
        GrowthConfig {
            source: Source::parse("sheet.xlsx"),
            metric: Metric::Cases,
            days,
            threshold: None,
            exclude: vec!["JPG11668".to_string()],
            timeout: None,
        }
    }

    fn points(totals: &[f64]) -> Vec<SeriesPoint> {
        totals
            .iter()
            .enumerate()
            .map(|(i, &t)| SeriesPoint::new(format!("2020-03-{:02}", i + 1), 0.0, t))
            .collect()
    }

    #[test]
    fn daily_doubling_is_one_hundred_percent() {
        let mut groups = BTreeMap::new();
        groups.insert("US".to_string(), points(&[10.0, 50.0, 100.0, 200.0, 400.0, 800.0, 1600.0]));

        let rows = growth_rankings(&groups, &config(5));
        assert_eq!(rows.len(), 1);
        assert!((rows[0].growth - 2.0).abs() < 1e-9);
        assert_eq!(rows[0].percent(), "100%");
        assert_eq!(rows[0].totals, vec![100.0, 200.0, 400.0, 800.0, 1600.0]);
        assert_eq!(rows[0].dates[0], "2020-03-03");
    }

    #[test]
    fn ineligible_regions_are_skipped() {
        let mut groups = BTreeMap::new();
        // Excluded by code.
        groups.insert("JPG11668".to_string(), points(&[600.0, 700.0, 800.0, 900.0, 1000.0]));
        // Too short.
        groups.insert("AA".to_string(), points(&[600.0, 700.0, 800.0]));
        // Zero at the start of the window.
        groups.insert("BB".to_string(), points(&[0.0, 100.0, 200.0, 400.0, 800.0]));
        // Below the cases threshold of 500.
        groups.insert("CC".to_string(), points(&[100.0, 150.0, 200.0, 300.0, 499.0]));
        groups.insert("DE".to_string(), points(&[500.0, 550.0, 600.0, 650.0, 700.0]));

        let rows = growth_rankings(&groups, &config(5));
        let ids: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(ids, vec!["DE"]);
    }

    #[test]
    fn rows_are_sorted_fastest_first() {
        let mut groups = BTreeMap::new();
        groups.insert("AA".to_string(), points(&[1000.0, 1100.0, 1210.0]));
        groups.insert("BB".to_string(), points(&[1000.0, 2000.0, 4000.0]));
        groups.insert("CC".to_string(), points(&[1000.0, 1500.0, 2250.0]));

        let rows = growth_rankings(&groups, &config(3));
        let ids: Vec<&str> = rows.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(ids, vec!["BB", "CC", "AA"]);
    }

    #[test]
    fn tsv_table_golden() {
        let rows = vec![
            GrowthRow {
                region: "US".to_string(),
                dates: vec!["2020-03-30".to_string(), "2020-03-31".to_string()],
                totals: vec![1000.0, 2000.0],
                growth: 2.0,
            },
            GrowthRow {
                region: "DE".to_string(),
                dates: vec!["2020-03-30".to_string(), "2020-03-31".to_string()],
                totals: vec![800.0, 1000.0],
                growth: 1.25,
            },
        ];

        let mut buf = Vec::new();
        write_growth_tsv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "ID\t03/30\t03/31\tDaily\nUS\t1000\t2000\t100%\nDE\t800\t1000\t25%\n"
        );
    }

    #[test]
    fn empty_ranking_still_has_a_header() {
        let mut buf = Vec::new();
        write_growth_tsv(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "ID\tDaily\n");
    }
}
