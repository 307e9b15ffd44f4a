//! Coordinate mapping shared by the SVG and terminal renderers.
//!
//! X is the day index since a region crossed the threshold (linear), Y the
//! cumulative total (logarithmic, niced to powers of ten).

use crate::domain::RegionSeries;

/// Data-space extent of a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotBounds {
    /// Last day index of the longest series (`len - 1`).
    pub x_max: f64,
    /// Threshold the series start at.
    pub min_y: f64,
    /// Largest cumulative total observed in any series.
    pub observed_max: f64,
    /// Niced log domain covering `[min_y, observed_max]`.
    pub y_lo: f64,
    pub y_hi: f64,
}

impl PlotBounds {
    /// Bounds of a selected series set. `None` when nothing is plottable
    /// (every series empty, or a non-positive threshold on a log axis).
    pub fn from_series(series: &[RegionSeries], min_y: f64) -> Option<Self> {
        if !(min_y.is_finite() && min_y > 0.0) {
            return None;
        }

        let longest = series.iter().map(RegionSeries::len).max().unwrap_or(0);
        if longest == 0 {
            return None;
        }

        let observed_max = series
            .iter()
            .filter_map(RegionSeries::last_total)
            .fold(min_y, f64::max);
        let (y_lo, y_hi) = nice_log_domain(min_y, observed_max);

        Some(Self {
            x_max: (longest - 1) as f64,
            min_y,
            observed_max,
            y_lo,
            y_hi,
        })
    }

    /// X domain, widened to `[0, 1]` when the longest series has one point.
    pub fn x_domain(&self) -> (f64, f64) {
        (0.0, self.x_max.max(1.0))
    }
}

/// Linear mapping from a domain onto a (pixel or cell) range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Logarithmic mapping. Pass an inverted range (`(bottom, top)`) so larger
/// values land higher on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    log_domain: (f64, f64),
    range: (f64, f64),
}

impl LogScale {
    /// `domain` must be strictly positive.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            log_domain: (domain.0.ln(), domain.1.ln()),
            range,
        }
    }

    pub fn map(&self, v: f64) -> f64 {
        let (l0, l1) = self.log_domain;
        let (r0, r1) = self.range;
        if l1 == l0 {
            return r0;
        }
        r0 + (v.ln() - l0) / (l1 - l0) * (r1 - r0)
    }
}

/// Extend `[lo, hi]` outwards to the surrounding powers of ten.
pub fn nice_log_domain(lo: f64, hi: f64) -> (f64, f64) {
    let lo_exp = snapped_log10(lo).floor() as i32;
    let mut hi_exp = snapped_log10(hi).ceil() as i32;
    if hi_exp <= lo_exp {
        hi_exp = lo_exp + 1;
    }
    (10f64.powi(lo_exp), 10f64.powi(hi_exp))
}

/// Tick values for a log axis, using the densest of `1..9`, `{1, 2, 5}` or
/// `{1}` per decade that keeps roughly `target` ticks.
pub fn log_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    const SUBS: [&[f64]; 3] = [
        &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        &[1.0, 2.0, 5.0],
        &[1.0],
    ];
    let limit = target + target / 2;
    let first = snapped_log10(lo).floor() as i32;
    let last = snapped_log10(hi).ceil() as i32;

    let mut ticks = Vec::new();
    for subs in SUBS {
        ticks.clear();
        for exp in first..=last {
            let base = 10f64.powi(exp);
            for &s in subs {
                let v = s * base;
                if v >= lo * (1.0 - 1e-9) && v <= hi * (1.0 + 1e-9) {
                    ticks.push(v);
                }
            }
        }
        if ticks.len() <= limit {
            break;
        }
    }
    ticks
}

/// Integer tick values for the day axis, stepping by 1, 2 or 5 × 10^k.
pub fn linear_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let span = hi - lo;
    if !(span.is_finite() && span > 0.0) || target == 0 {
        return vec![lo];
    }

    let raw = span / target as f64;
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude)
        .max(1.0);

    let mut ticks = Vec::new();
    let mut v = (lo / step).ceil() * step;
    while v <= hi + 1e-9 {
        ticks.push(v);
        v += step;
    }
    ticks
}

/// Plain integer label.
pub fn format_integer(v: f64) -> String {
    format!("{}", v.round() as i64)
}

/// Grouped-digit label without scientific notation: `1234567 → "1,234,567"`.
/// Values below one keep a single decimal.
pub fn format_grouped(v: f64) -> String {
    if v.abs() < 1.0 && v != 0.0 {
        return format!("{v:.1}");
    }

    let n = v.round() as i64;
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `log10` with values within rounding error of an integer snapped to it.
fn snapped_log10(v: f64) -> f64 {
    let l = v.log10();
    if (l - l.round()).abs() < 1e-9 {
        l.round()
    } else {
        l
    }
}
