//! One analysis run: resolve the range, fetch, derive yields, shape the chart.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::axis::{compute_axis_range, AxisRange};
use crate::domain::chart::{compose_chart, ChartInputs, ChartSpec};
use crate::domain::date_range::{DateRange, RangeRequest};
use crate::domain::dividend::{select_dividend_year, AnnualDividendSelection};
use crate::domain::error::DivyieldError;
use crate::domain::price_bar::PriceBar;
use crate::domain::ticker::normalize_ticker;
use crate::domain::yield_series::{
    build_per_year_series, build_yield_series, YieldPolicy, YieldSeries,
};
use crate::ports::data_port::MarketDataPort;

pub const TABLE_COLUMNS: [&str; 7] = [
    "Date",
    "Open",
    "High",
    "Low",
    "Close",
    "Volume",
    "DIVIDEND YIELD",
];

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub range: RangeRequest,
    pub policy: YieldPolicy,
}

/// The dashboard's headline figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub latest_close: f64,
    pub highest_close: f64,
    pub lowest_close: f64,
    pub average_yield: f64,
}

/// One bar joined with its yield. Field names double as the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    #[serde(rename = "DIVIDEND YIELD")]
    pub dividend_yield: f64,
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub ticker: String,
    pub range: DateRange,
    pub policy: YieldPolicy,
    pub selection: AnnualDividendSelection,
    pub bars: Vec<PriceBar>,
    pub series: YieldSeries,
    pub axis: AxisRange,
    pub summary: Summary,
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

impl AnalysisResult {
    /// Whether this result already answers a request for `ticker` over
    /// `range` under `policy`, so it can be shown again without refetching.
    pub fn matches(&self, ticker: &str, range: DateRange, policy: YieldPolicy) -> bool {
        self.ticker == ticker && self.range == range && self.policy == policy
    }

    /// Display rows, rounded to 4 places.
    pub fn table_rows(&self) -> Vec<TableRow> {
        self.raw_rows()
            .map(|r| TableRow {
                open: round4(r.open),
                high: round4(r.high),
                low: round4(r.low),
                close: round4(r.close),
                dividend_yield: round4(r.dividend_yield),
                ..r
            })
            .collect()
    }

    /// Unrounded rows, as exported.
    pub fn raw_rows(&self) -> impl Iterator<Item = TableRow> + '_ {
        self.bars
            .iter()
            .zip(self.series.points())
            .map(|(bar, point)| TableRow {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                dividend_yield: point.yield_percent,
            })
    }

    pub fn chart(&self) -> ChartSpec {
        compose_chart(&ChartInputs {
            ticker: &self.ticker,
            range: self.range,
            bars: &self.bars,
            series: &self.series,
            axis: self.axis,
            policy: self.policy,
            selection: self.selection,
        })
    }
}

fn summarize(bars: &[PriceBar], series: &YieldSeries) -> Option<Summary> {
    let latest_close = bars.last()?.close;
    let highest_close = bars.iter().map(|b| b.close).reduce(f64::max)?;
    let lowest_close = bars.iter().map(|b| b.close).reduce(f64::min)?;
    Some(Summary {
        latest_close,
        highest_close,
        lowest_close,
        average_yield: series.mean()?,
    })
}

/// Run the whole pipeline against `port`.
///
/// Dividends are fetched first since the year selection only needs the
/// range end; an empty price history is `DataUnavailable`.
pub fn run_analysis(
    port: &dyn MarketDataPort,
    request: &AnalysisRequest,
    today: NaiveDate,
) -> Result<AnalysisResult, DivyieldError> {
    let ticker = normalize_ticker(&request.ticker)?;
    let range = request.range.resolve(today)?;
    log::info!("analyzing {ticker} over {range} ({} policy)", request.policy);

    let dividends = port.fetch_dividends(&ticker)?;
    let selection = select_dividend_year(&dividends, range.end);
    log::debug!(
        "{ticker}: {} dividend records, using {} total {:.4}",
        dividends.len(),
        selection.year,
        selection.total
    );

    let mut bars = port.fetch_prices(&ticker, range)?;
    if bars.is_empty() {
        return Err(DivyieldError::DataUnavailable {
            ticker,
            start: range.start,
            end: range.end,
        });
    }
    bars.sort_by_key(|b| b.date);

    let series = match request.policy {
        YieldPolicy::Static => build_yield_series(&bars, selection.total)?,
        YieldPolicy::PerYear => build_per_year_series(&bars, &dividends)?,
    };

    let (axis, summary) = match (compute_axis_range(&series), summarize(&bars, &series)) {
        (Some(axis), Some(summary)) => (axis, summary),
        _ => {
            return Err(DivyieldError::DataUnavailable {
                ticker,
                start: range.start,
                end: range.end,
            });
        }
    };

    Ok(AnalysisResult {
        ticker,
        range,
        policy: request.policy,
        selection,
        bars,
        series,
        axis,
        summary,
    })
}
