//! SVG chart rendering with Plotters.
//!
//! Layout: log-Y / linear-X chart with low-contrast gridlines at the tick
//! positions, dashed doubling-time reference lines, one polyline plus point
//! markers per region, and a legend in the lower-right corner.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::domain::RegionSeries;
use crate::error::AppError;
use crate::plot::doubling::doubling_lines;
use crate::plot::scale::{PlotBounds, format_grouped, format_integer, linear_ticks, log_ticks};

/// Ordinal palette (d3 `schemeCategory10`), indexed by region position.
pub const CATEGORY10: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

const GRID: RGBColor = RGBColor(0xe6, 0xe6, 0xe6);
const AXIS: RGBColor = RGBColor(0x33, 0x33, 0x33);
const REFERENCE: RGBColor = RGBColor(0x66, 0x66, 0x66);
const FOOTNOTE: RGBColor = RGBColor(0x88, 0x88, 0x88);

const X_TICKS: usize = 10;
const Y_TICKS: usize = 9;
const MARKER_RADIUS: i32 = 2;

/// Presentation options for one chart.
#[derive(Debug, Clone)]
pub struct SvgOptions {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Small print in the bottom-right corner (e.g. the data source).
    pub footnote: Option<String>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            title: String::new(),
            footnote: None,
        }
    }
}

/// Color of the region at `index` in the selected set.
pub fn region_color(index: usize) -> RGBColor {
    CATEGORY10[index % CATEGORY10.len()]
}

/// Render the selected series set into an SVG document.
pub fn render_svg(
    series: &[RegionSeries],
    min_y: f64,
    options: &SvgOptions,
) -> Result<String, AppError> {
    let bounds = PlotBounds::from_series(series, min_y)
        .ok_or_else(|| AppError::data("No region reached the threshold; nothing to plot."))?;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        draw_chart(&root, series, &bounds, options)
            .map_err(|e| AppError::render(format!("Failed to render chart: {e}")))?;
        root.present()
            .map_err(|e| AppError::render(format!("Failed to finish chart: {e}")))?;
    }
    Ok(svg)
}

/// Write a rendered document to disk.
pub fn write_svg(path: &Path, svg: &str) -> Result<(), AppError> {
    std::fs::write(path, svg)
        .map_err(|e| AppError::config(format!("Failed to write chart '{}': {e}", path.display())))
}

fn draw_chart(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    series: &[RegionSeries],
    bounds: &PlotBounds,
    options: &SvgOptions,
) -> Result<(), DrawingAreaErrorKind<std::io::Error>> {
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = bounds.x_domain();
    let x_ticks = linear_ticks(x_lo, x_hi, X_TICKS);
    let y_ticks = log_ticks(bounds.y_lo, bounds.y_hi, Y_TICKS);

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 16).into_font())
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 30)
        .build_cartesian_2d(x_lo..x_hi, (bounds.y_lo..bounds.y_hi).log_scale())?;

    // Built-in mesh lines don't land on our tick values; gridlines are drawn below.
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(x_ticks.len())
        .y_labels(y_ticks.len())
        .x_label_formatter(&|v| format_integer(*v))
        .y_label_formatter(&|v| format_grouped(*v))
        .axis_style(&AXIS)
        .label_style(("sans-serif", 11).into_font().color(&AXIS))
        .draw()?;

    for &x in &x_ticks {
        chart.draw_series(LineSeries::new(
            [(x, bounds.y_lo), (x, bounds.y_hi)],
            GRID.stroke_width(1),
        ))?;
    }
    for &y in &y_ticks {
        chart.draw_series(LineSeries::new([(x_lo, y), (x_hi, y)], GRID.stroke_width(1)))?;
    }

    for line in doubling_lines(bounds.min_y, bounds.observed_max, bounds.x_max) {
        chart.draw_series(DashedLineSeries::new(
            vec![line.start, line.end],
            2,
            2,
            REFERENCE.stroke_width(1),
        ))?;
    }

    for (idx, region) in series.iter().enumerate() {
        let color = region_color(idx);
        let coords: Vec<(f64, f64)> = region
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.total))
            .collect();

        chart
            .draw_series(LineSeries::new(coords.iter().copied(), color.stroke_width(1)))?
            .label(region.region.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

        chart.draw_series(
            coords
                .iter()
                .map(|&c| Circle::new(c, MARKER_RADIUS, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .margin(10)
        .legend_area_size(26)
        .background_style(WHITE.mix(0.85))
        .border_style(&GRID)
        .label_font(("sans-serif", 11).into_font())
        .draw()?;

    if let Some(note) = &options.footnote {
        let (w, h) = root.dim_in_pixel();
        let style = ("sans-serif", 9)
            .into_font()
            .color(&FOOTNOTE)
            .pos(Pos::new(HPos::Right, VPos::Bottom));
        root.draw(&Text::new(note.as_str(), (w as i32 - 4, h as i32 - 2), style))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeriesPoint;

    fn series(region: &str, totals: &[f64]) -> RegionSeries {
        RegionSeries::new(
            region,
            totals
                .iter()
                .map(|&t| SeriesPoint::new("2020-03-01", t, t))
                .collect(),
        )
    }

    /// Text nodes may be written inline or on their own line.
    fn has_text(svg: &str, text: &str) -> bool {
        svg.contains(&format!(">{text}<")) || svg.lines().any(|l| l.trim() == text)
    }

    #[test]
    fn chart_lists_every_region_and_marks_every_point() {
        let set = vec![
            series("US", &[100.0, 250.0, 2500.0]),
            series("JP", &[]),
            series("DE", &[120.0, 400.0]),
        ];
        let options = SvgOptions {
            title: "Coronavirus Total Cases".to_string(),
            footnote: Some("Source: test.xlsx".to_string()),
            ..SvgOptions::default()
        };
        let svg = render_svg(&set, 100.0, &options).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Coronavirus Total Cases"));
        assert!(svg.contains("Source: test.xlsx"));
        // Empty regions still get a legend row.
        for code in ["US", "JP", "DE"] {
            assert!(has_text(&svg, code), "legend missing {code}");
        }
        assert_eq!(svg.matches("<circle").count(), 5);
        // Grouped-digit Y labels.
        assert!(has_text(&svg, "1,000"));
    }

    #[test]
    fn chart_draws_reference_lines_and_gridlines() {
        let set = vec![series("US", &[100.0, 250.0, 2500.0])];
        let svg = render_svg(&set, 100.0, &SvgOptions::default())
            .unwrap()
            .to_ascii_uppercase();

        // Seven dashed references, each split into at least one dash.
        assert!(svg.matches("#666666").count() >= 7);
        // Days 0..=2 and 100, 200, 500, ..., 10,000.
        let ticks = linear_ticks(0.0, 2.0, X_TICKS).len() + log_ticks(100.0, 10_000.0, Y_TICKS).len();
        assert_eq!(ticks, 10);
        assert!(svg.matches("#E6E6E6").count() >= ticks);
    }

    #[test]
    fn empty_set_is_a_data_error() {
        let err = render_svg(&[series("US", &[])], 100.0, &SvgOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }

    #[test]
    fn palette_wraps_by_index() {
        assert_eq!(region_color(0), CATEGORY10[0]);
        assert_eq!(region_color(11), CATEGORY10[1]);
    }
}
