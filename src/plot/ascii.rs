//! Terminal preview of the chart on a fixed-size character grid.
//!
//! Same coordinate mapping as the SVG (linear days, log totals). Elements:
//! - region lines and points: one marker character per region (`1`, `2`, ...)
//! - doubling-time reference lines: `.`

use crate::domain::RegionSeries;
use crate::plot::doubling::doubling_lines;
use crate::plot::scale::{LinearScale, LogScale, PlotBounds, format_grouped};

const MARKERS: &[u8] = b"123456789abcdefghijklmnopqrstuvwxyz";
const REFERENCE: char = '.';

/// Marker character of the region at `index`.
pub fn marker(index: usize) -> char {
    MARKERS[index % MARKERS.len()] as char
}

/// Render the selected series set as a character grid with a legend line.
pub fn render_ascii_plot(series: &[RegionSeries], min_y: f64, width: usize, height: usize) -> String {
    let Some(bounds) = PlotBounds::from_series(series, min_y) else {
        return "Plot: no region reached the threshold\n".to_string();
    };

    let width = width.max(10);
    let height = height.max(5);
    let (x_lo, x_hi) = bounds.x_domain();
    let x_scale = LinearScale::new((x_lo, x_hi), (0.0, width as f64 - 1.0));
    let y_scale = LogScale::new((bounds.y_lo, bounds.y_hi), (height as f64 - 1.0, 0.0));
    let cell = |x: f64, y: f64| -> (usize, usize) {
        (
            clamp_cell(x_scale.map(x), width),
            clamp_cell(y_scale.map(y), height),
        )
    };

    let mut grid = vec![vec![' '; width]; height];

    // Region lines first, then their points on top, then references in the gaps.
    for (idx, region) in series.iter().enumerate() {
        let ch = marker(idx);
        let cells: Vec<(usize, usize)> = region
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| cell(i as f64, p.total))
            .collect();
        for pair in cells.windows(2) {
            draw_line(&mut grid, pair[0], pair[1], ch);
        }
        for &(x, y) in &cells {
            grid[y][x] = ch;
        }
    }

    for line in doubling_lines(bounds.min_y, bounds.observed_max, bounds.x_max) {
        let from = cell(line.start.0, line.start.1);
        let to = cell(line.end.0, line.end.1);
        draw_line(&mut grid, from, to, REFERENCE);
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: days=[0, {}] | y=[{}, {}] (log)\n",
        bounds.x_max,
        format_grouped(bounds.y_lo),
        format_grouped(bounds.y_hi)
    ));

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    let legend: Vec<String> = series
        .iter()
        .enumerate()
        .map(|(idx, s)| format!("{} {}", marker(idx), s.region))
        .collect();
    out.push_str(&legend.join("  "));
    out.push('\n');

    out
}

fn clamp_cell(v: f64, size: usize) -> usize {
    if !v.is_finite() {
        return 0;
    }
    v.round().clamp(0.0, size as f64 - 1.0) as usize
}

/// Integer line drawing (Bresenham-ish). Only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let mut x0 = from.0 as isize;
    let mut y0 = from.1 as isize;
    let x1 = to.0 as isize;
    let y1 = to.1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
