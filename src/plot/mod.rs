//! Chart rendering.
//!
//! - coordinate mapping and tick labels (`scale`)
//! - doubling-time reference lines (`doubling`)
//! - SVG output through Plotters (`svg`)
//! - terminal preview (`ascii`)

pub mod ascii;
pub mod doubling;
pub mod scale;
pub mod svg;

pub use ascii::render_ascii_plot;
pub use svg::{SvgOptions, render_svg, write_svg};
