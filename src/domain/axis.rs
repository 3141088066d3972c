//! Secondary-axis display range for the yield line.

use crate::domain::yield_series::YieldSeries;

/// Share of the series' spread added above and below it.
pub const AXIS_MARGIN_RATIO: f64 = 0.1;

/// Series whose minimum exceeds this get their lower bound pinned here, so a
/// flat high-yield line is not drawn as if it swung from zero.
pub const HIGH_YIELD_FLOOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

/// Padded, floor-clamped range; `None` for an empty series.
///
/// A constant series has no spread, so the bounds collapse to its value
/// unless the high-yield floor applies.
pub fn compute_axis_range(series: &YieldSeries) -> Option<AxisRange> {
    let min_y = series.min()?;
    let max_y = series.max()?;
    let margin = (max_y - min_y) * AXIS_MARGIN_RATIO;

    let lower = if min_y > HIGH_YIELD_FLOOR {
        HIGH_YIELD_FLOOR
    } else {
        (min_y - margin).max(0.0)
    };

    Some(AxisRange {
        min: lower,
        max: max_y + margin,
    })
}
