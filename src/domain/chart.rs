//! Dual-axis chart description.
//!
//! Shapes already-computed data into something a renderer can draw: a
//! high/low band and a close line on the price axis, the yield line (and an
//! average reference line when a dividend is paid) on the secondary axis,
//! plus markers for the highest and lowest close.

use chrono::NaiveDate;

use crate::domain::axis::AxisRange;
use crate::domain::date_range::DateRange;
use crate::domain::dividend::AnnualDividendSelection;
use crate::domain::price_bar::{first_max_close, first_min_close, PriceBar};
use crate::domain::yield_series::{YieldPolicy, YieldSeries};

pub const CLOSE_COLOR: &str = "#2E86AB";
pub const BAND_FILL: &str = "rgba(162,59,114,0.15)";
pub const YIELD_COLOR: &str = "#F18F01";
pub const YIELD_FILL: &str = "rgba(241,143,1,0.2)";
pub const AVERAGE_COLOR: &str = "red";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Price,
    Yield,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub label: String,
    pub fill: &'static str,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub label: String,
    pub color: &'static str,
    pub width: f64,
    /// SVG dash pattern, solid when `None`.
    pub dash: Option<&'static str>,
    /// Fill between the line and the axis minimum.
    pub fill: Option<&'static str>,
    pub axis: Axis,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub index: usize,
    pub date: NaiveDate,
    pub value: f64,
    pub text: String,
    pub background: &'static str,
    /// Label offset below the point instead of above.
    pub below: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub subtitle: String,
    pub dates: Vec<NaiveDate>,
    pub band: Band,
    pub lines: Vec<Line>,
    pub annotations: Vec<Annotation>,
    pub price_label: String,
    pub yield_label: String,
    pub yield_axis: AxisRange,
}

impl ChartSpec {
    pub fn lines_on(&self, axis: Axis) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(move |l| l.axis == axis)
    }

    /// Lowest low and highest high across the band.
    pub fn price_extent(&self) -> Option<(f64, f64)> {
        let min = self.band.lower.iter().copied().reduce(f64::min)?;
        let max = self.band.upper.iter().copied().reduce(f64::max)?;
        Some((min, max))
    }
}

pub struct ChartInputs<'a> {
    pub ticker: &'a str,
    pub range: DateRange,
    pub bars: &'a [PriceBar],
    pub series: &'a YieldSeries,
    pub axis: AxisRange,
    pub policy: YieldPolicy,
    pub selection: AnnualDividendSelection,
}

fn yield_line_label(inputs: &ChartInputs<'_>) -> String {
    match inputs.policy {
        YieldPolicy::Static => format!("Dividend Yield ({} data)", inputs.selection.year),
        YieldPolicy::PerYear => "Dividend Yield (per-year data)".to_string(),
    }
}

pub fn compose_chart(inputs: &ChartInputs<'_>) -> ChartSpec {
    let bars = inputs.bars;

    let band = Band {
        label: "Daily High-Low Range".to_string(),
        fill: BAND_FILL,
        upper: bars.iter().map(|b| b.high).collect(),
        lower: bars.iter().map(|b| b.low).collect(),
    };

    let mut lines = vec![
        Line {
            label: "Close Price".to_string(),
            color: CLOSE_COLOR,
            width: 3.0,
            dash: None,
            fill: None,
            axis: Axis::Price,
            values: bars.iter().map(|b| b.close).collect(),
        },
        Line {
            label: yield_line_label(inputs),
            color: YIELD_COLOR,
            width: 3.0,
            dash: Some("2,2"),
            fill: Some(YIELD_FILL),
            axis: Axis::Yield,
            values: inputs.series.values().collect(),
        },
    ];

    if inputs.series.any_positive() {
        if let Some(avg) = inputs.series.mean() {
            lines.push(Line {
                label: format!("Avg Yield: {avg:.2}%"),
                color: AVERAGE_COLOR,
                width: 2.5,
                dash: Some("1,3"),
                fill: None,
                axis: Axis::Yield,
                values: vec![avg; inputs.series.len()],
            });
        }
    }

    let mut annotations = Vec::with_capacity(2);
    if let Some(i) = first_max_close(bars) {
        annotations.push(Annotation {
            index: i,
            date: bars[i].date,
            value: bars[i].close,
            text: format!("High: {:.2}", bars[i].close),
            background: "yellow",
            below: false,
        });
    }
    if let Some(i) = first_min_close(bars) {
        annotations.push(Annotation {
            index: i,
            date: bars[i].date,
            value: bars[i].close,
            text: format!("Low: {:.2}", bars[i].close),
            background: "lightblue",
            below: true,
        });
    }

    ChartSpec {
        title: format!("{} Stock Price & Dividend Yield Analysis", inputs.ticker),
        subtitle: format!("({})", inputs.range),
        dates: bars.iter().map(|b| b.date).collect(),
        band,
        lines,
        annotations,
        price_label: "Stock Price".to_string(),
        yield_label: "Dividend Yield (%)".to_string(),
        yield_axis: inputs.axis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::axis::compute_axis_range;
    use crate::domain::yield_series::{build_yield_series, YieldPoint};

    fn bars() -> Vec<PriceBar> {
        [(2, 50.0), (3, 55.0), (4, 48.0), (5, 55.0), (8, 48.0)]
            .iter()
            .map(|&(day, close)| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 10,
            })
            .collect()
    }

    fn range() -> DateRange {
        DateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        }
    }

    fn compose(total: f64) -> ChartSpec {
        let bars = bars();
        let series = build_yield_series(&bars, total).unwrap();
        let axis = compute_axis_range(&series).unwrap();
        compose_chart(&ChartInputs {
            ticker: "KO",
            range: range(),
            bars: &bars,
            series: &series,
            axis,
            policy: YieldPolicy::Static,
            selection: AnnualDividendSelection { year: 2023, total },
        })
    }

    #[test]
    fn includes_band_close_and_yield_lines() {
        let chart = compose(2.0);
        assert_eq!(chart.band.upper.len(), 5);
        assert_eq!(chart.lines_on(Axis::Price).count(), 1);
        assert_eq!(chart.lines_on(Axis::Yield).count(), 2);
        assert_eq!(chart.lines[1].label, "Dividend Yield (2023 data)");
        assert_eq!(chart.title, "KO Stock Price & Dividend Yield Analysis");
        assert_eq!(chart.subtitle, "(2024-01-01 to 2024-01-10)");
    }

    #[test]
    fn average_line_is_constant_mean() {
        let chart = compose(2.0);
        let avg = chart.lines.iter().find(|l| l.label.starts_with("Avg Yield")).unwrap();
        let expected = chart.lines[1].values.iter().sum::<f64>() / 5.0;
        assert!(avg.values.iter().all(|v| (v - expected).abs() < 1e-12));
        assert_eq!(avg.values.len(), 5);
    }

    #[test]
    fn no_average_line_without_dividend() {
        let chart = compose(0.0);
        assert!(!chart.lines.iter().any(|l| l.label.starts_with("Avg Yield")));
    }

    #[test]
    fn per_year_chart_follows_series_not_end_year() {
        let bars = bars();
        // only the first two bars fall in a paying year
        let series = YieldSeries::from_points(
            bars.iter()
                .enumerate()
                .map(|(i, b)| YieldPoint {
                    date: b.date,
                    yield_percent: if i < 2 { 2.0 } else { 0.0 },
                })
                .collect(),
        );
        let axis = compute_axis_range(&series).unwrap();
        let chart = compose_chart(&ChartInputs {
            ticker: "KO",
            range: range(),
            bars: &bars,
            series: &series,
            axis,
            policy: YieldPolicy::PerYear,
            selection: AnnualDividendSelection { year: 2024, total: 0.0 },
        });

        assert_eq!(chart.lines[1].label, "Dividend Yield (per-year data)");
        let avg = chart
            .lines
            .iter()
            .find(|l| l.label.starts_with("Avg Yield"))
            .unwrap();
        assert!((avg.values[0] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn annotations_mark_first_extremes() {
        let chart = compose(2.0);
        let high = &chart.annotations[0];
        let low = &chart.annotations[1];
        assert_eq!(high.index, 1);
        assert_eq!(high.text, "High: 55.00");
        assert_eq!(low.index, 2);
        assert_eq!(low.date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert!(low.below);
    }

    #[test]
    fn price_extent_spans_band() {
        let chart = compose(2.0);
        assert_eq!(chart.price_extent(), Some((47.0, 56.0)));
    }
}
