//! Standalone HTML chart export implementing ReportPort.
//!
//! One self-contained page: summary cards, the inline SVG chart and the
//! rounded data table. The web dashboard renders the same view rows.

use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;

use crate::adapters::chart_svg::render_chart_svg;
use crate::domain::analysis::{AnalysisResult, TABLE_COLUMNS};
use crate::domain::error::DivyieldError;
use crate::domain::yield_series::YieldPolicy;
use crate::ports::report_port::ReportPort;

pub struct SummaryCard {
    pub label: &'static str,
    pub value: String,
}

/// A table row with every cell already formatted.
pub struct RowView {
    pub cells: Vec<String>,
}

pub fn summary_cards(result: &AnalysisResult) -> Vec<SummaryCard> {
    let s = &result.summary;
    vec![
        SummaryCard {
            label: "Latest Close",
            value: format!("{:.2}", s.latest_close),
        },
        SummaryCard {
            label: "Period High",
            value: format!("{:.2}", s.highest_close),
        },
        SummaryCard {
            label: "Period Low",
            value: format!("{:.2}", s.lowest_close),
        },
        SummaryCard {
            label: "Average Yield",
            value: format!("{:.2}%", s.average_yield),
        },
    ]
}

pub fn row_views(result: &AnalysisResult) -> Vec<RowView> {
    result
        .table_rows()
        .into_iter()
        .map(|r| RowView {
            cells: vec![
                r.date.to_string(),
                format!("{:.4}", r.open),
                format!("{:.4}", r.high),
                format!("{:.4}", r.low),
                format!("{:.4}", r.close),
                r.volume.to_string(),
                format!("{:.4}", r.dividend_yield),
            ],
        })
        .collect()
}

/// Caption line under the chart naming the dividend figure in use.
pub fn dividend_note(result: &AnalysisResult) -> String {
    match result.policy {
        YieldPolicy::Static if result.selection.pays_dividend() => format!(
            "Annual dividend {:.4} from {} ({} policy)",
            result.selection.total, result.selection.year, result.policy
        ),
        YieldPolicy::Static => format!("No dividends recorded for {}", result.selection.year),
        YieldPolicy::PerYear if result.series.any_positive() => {
            "Annual dividend selected per calendar year (per-year policy)".to_string()
        }
        YieldPolicy::PerYear => format!("No dividends recorded in {}", result.range),
    }
}

#[derive(Template)]
#[template(path = "chart_page.html")]
struct ChartPageTemplate<'a> {
    ticker: &'a str,
    range: String,
    cards: Vec<SummaryCard>,
    chart_svg: String,
    note: String,
    columns: &'a [&'a str],
    rows: Vec<RowView>,
}

pub struct HtmlChartAdapter;

impl HtmlChartAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, result: &AnalysisResult) -> Result<String, DivyieldError> {
        let template = ChartPageTemplate {
            ticker: &result.ticker,
            range: result.range.to_string(),
            cards: summary_cards(result),
            chart_svg: render_chart_svg(&result.chart()),
            note: dividend_note(result),
            columns: &TABLE_COLUMNS,
            rows: row_views(result),
        };
        template
            .render()
            .map_err(|e| DivyieldError::Io(std::io::Error::other(e.to_string())))
    }
}

impl Default for HtmlChartAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for HtmlChartAdapter {
    fn file_name(&self, result: &AnalysisResult) -> String {
        format!(
            "{}_interactive_chart_{}_to_{}.html",
            result.ticker,
            result.range.start.format("%Y%m%d"),
            result.range.end.format("%Y%m%d")
        )
    }

    fn write(&self, result: &AnalysisResult, output_dir: &Path) -> Result<PathBuf, DivyieldError> {
        let html = self.render(result)?;
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(self.file_name(result));
        fs::write(&path, html)?;
        log::info!("wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::Summary;
    use crate::domain::axis::compute_axis_range;
    use crate::domain::date_range::DateRange;
    use crate::domain::dividend::AnnualDividendSelection;
    use crate::domain::price_bar::PriceBar;
    use crate::domain::yield_series::{build_yield_series, YieldPoint, YieldSeries};
    use chrono::{Datelike, NaiveDate};
    use tempfile::tempdir;

    fn sample_result(dividend: f64) -> AnalysisResult {
        let bars: Vec<PriceBar> = [(2, 59.4), (3, 60.25), (4, 59.6)]
            .iter()
            .map(|&(day, close)| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                open: close,
                high: close + 0.4,
                low: close - 0.5,
                close,
                volume: 12_000,
            })
            .collect();
        let series = build_yield_series(&bars, dividend).unwrap();
        let axis = compute_axis_range(&series).unwrap();
        AnalysisResult {
            ticker: "KO".into(),
            range: DateRange {
                start: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            },
            policy: YieldPolicy::Static,
            selection: AnnualDividendSelection { year: 2023, total: dividend },
            summary: Summary {
                latest_close: 59.6,
                highest_close: 60.25,
                lowest_close: 59.4,
                average_yield: series.mean().unwrap(),
            },
            bars,
            series,
            axis,
        }
    }

    #[test]
    fn file_name_uses_compact_dates() {
        assert_eq!(
            HtmlChartAdapter::new().file_name(&sample_result(1.94)),
            "KO_interactive_chart_20231201_to_20240105.html"
        );
    }

    #[test]
    fn page_has_cards_chart_and_table() {
        let html = HtmlChartAdapter::new().render(&sample_result(1.94)).unwrap();
        assert!(html.contains("Latest Close"));
        assert!(html.contains("60.25"));
        assert!(html.contains("<svg"));
        assert!(html.contains("DIVIDEND YIELD"));
        assert!(html.contains("59.4000"));
        assert!(html.contains("Annual dividend 1.9400 from 2023"));
    }

    #[test]
    fn zero_dividend_note() {
        let html = HtmlChartAdapter::new().render(&sample_result(0.0)).unwrap();
        assert!(html.contains("No dividends recorded for 2023"));
        assert!(html.contains("0.0000"));
    }

    #[test]
    fn zero_dividend_cells_are_unsigned() {
        let rows = row_views(&sample_result(0.0));
        assert!(rows.iter().all(|r| r.cells[6] == "0.0000"));
    }

    #[test]
    fn per_year_note_follows_series() {
        let mut result = sample_result(0.0);
        result.policy = YieldPolicy::PerYear;
        result.selection = AnnualDividendSelection { year: 2024, total: 0.0 };
        assert_eq!(
            dividend_note(&result),
            "No dividends recorded in 2023-12-01 to 2024-01-05"
        );

        result.series = YieldSeries::from_points(
            result
                .bars
                .iter()
                .map(|b| YieldPoint {
                    date: b.date,
                    yield_percent: if b.date.day() == 2 { 3.0 } else { 0.0 },
                })
                .collect(),
        );
        let html = HtmlChartAdapter::new().render(&result).unwrap();
        assert!(html.contains("Annual dividend selected per calendar year"));
        assert!(html.contains("Dividend Yield (per-year data)"));
        assert!(html.contains("Avg Yield: 1.00%"));
        assert!(!html.contains("No dividends recorded"));
    }

    #[test]
    fn rows_are_four_places() {
        let rows = row_views(&sample_result(1.94));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].cells[4], "60.2500");
        assert_eq!(rows[1].cells[6], format!("{:.4}", 1.94 / 60.25 * 100.0));
    }

    #[test]
    fn write_creates_file() {
        let dir = tempdir().unwrap();
        let path = HtmlChartAdapter::new()
            .write(&sample_result(1.94), dir.path())
            .unwrap();
        assert!(path.exists());
        assert!(fs::read_to_string(path).unwrap().contains("KO"));
    }
}
