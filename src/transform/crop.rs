//! Shared time-axis cropping.
//!
//! One region's run can vastly outlast the others (an early, long outbreak)
//! and would stretch the shared X axis. When the longest series exceeds the
//! second-longest by more than the policy's padding, every series is cut to
//! `second_longest + padding` points, keeping the earliest ones.

use tracing::info;

use crate::domain::{CropPolicy, RegionSeries};

/// Apply the crop rule in place. Returns the crop length when it fired.
///
/// Empty series do not count towards the "two series" minimum.
pub fn crop_window(series: &mut [RegionSeries], policy: CropPolicy) -> Option<usize> {
    let padding = policy.padding?;

    let mut lengths: Vec<usize> = series
        .iter()
        .map(RegionSeries::len)
        .filter(|&n| n > 0)
        .collect();
    if lengths.len() < 2 {
        return None;
    }
    lengths.sort_unstable();

    let longest = lengths[lengths.len() - 1];
    let second = lengths[lengths.len() - 2];
    let crop = second + padding;
    if crop >= longest {
        return None;
    }

    for s in series.iter_mut() {
        s.points.truncate(crop);
    }
    info!("Cropped series to {crop} days (longest was {longest})");
    Some(crop)
}
