//! Terminal summary of a plotted run.

use crate::domain::RegionSeries;
use crate::plot::scale::format_grouped;

/// One line per region with its latest cumulative total, `-` when the region
/// never reached the threshold.
pub fn format_totals(series: &[RegionSeries], label: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total {label}:\n"));

    let width = series.iter().map(|s| s.region.len()).max().unwrap_or(0);
    for s in series {
        let total = s
            .last_total()
            .map(format_grouped)
            .unwrap_or_else(|| "-".to_string());
        let days = match s.len() {
            0 => String::new(),
            1 => "  (1 day)".to_string(),
            n => format!("  ({n} days)"),
        };
        out.push_str(&format!("{:<width$} {:>12}{days}\n", s.region, total));
    }

    out
}
