//! Doubling-time reference lines.
//!
//! Each line starts at `(0, min_y)` and follows a value that doubles every `d`
//! days, for `d` in `1..=7`. It ends where it reaches the observed maximum or,
//! if that happens past the last plotted day, at the last plotted day.

/// Doubling periods (days) that get a reference line.
pub const DOUBLING_DAYS: std::ops::RangeInclusive<u32> = 1..=7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceLine {
    /// Doubling period in days.
    pub days: u32,
    pub start: (f64, f64),
    pub end: (f64, f64),
}

/// Reference lines for a chart spanning `[0, x_max]` × `[min_y, max_y]`.
pub fn doubling_lines(min_y: f64, max_y: f64, x_max: f64) -> Vec<ReferenceLine> {
    DOUBLING_DAYS
        .map(|days| {
            let growth = 2f64.powf(1.0 / days as f64);
            let mut x2 = (max_y / min_y).ln() / growth.ln();
            let mut y2 = max_y;
            if x2 > x_max {
                x2 = x_max;
                y2 = growth.powf(x2) * min_y;
            }
            ReferenceLine {
                days,
                start: (0.0, min_y),
                end: (x2, y2),
            }
        })
        .collect()
}
