//! Yahoo Finance chart endpoint adapter.
//!
//! Prices and dividends both come from `/v8/finance/chart/{symbol}`; the
//! dividend history is the `events.dividends` map of a `range=max` request.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::domain::date_range::DateRange;
use crate::domain::dividend::DividendRecord;
use crate::domain::error::DivyieldError;
use crate::domain::price_bar::PriceBar;
use crate::ports::data_port::MarketDataPort;

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    events: Option<ChartEvents>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: HashMap<String, DividendEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

pub struct YahooAdapter {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl YahooAdapter {
    pub fn new(base_url: &str, user_agent: &str, timeout_secs: u64) -> Result<Self, DivyieldError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| DivyieldError::fetch(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn chart_url(&self, ticker: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, encode_symbol(ticker))
    }

    fn get_chart(&self, ticker: &str, query: &[(&str, String)]) -> Result<ChartResult, DivyieldError> {
        let url = self.chart_url(ticker);
        log::debug!("GET {url} {query:?}");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| DivyieldError::fetch(format!("request for {ticker} failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| DivyieldError::fetch(format!("reading response for {ticker}: {e}")))?;

        parse_chart(&body).map_err(|e| match e {
            // a non-JSON body is better explained by the status code
            DivyieldError::ExternalFetch { .. } if !status.is_success() => {
                DivyieldError::fetch(format!("{ticker}: HTTP {status}"))
            }
            other => other,
        })
    }
}

/// Yahoo expects `^` and `=` percent-encoded in the path.
fn encode_symbol(ticker: &str) -> String {
    ticker.replace('^', "%5E").replace('=', "%3D")
}

fn epoch(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Trading date of a bar timestamp, in the exchange's local time.
fn local_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp + gmtoffset, 0).map(|dt| dt.date_naive())
}

fn parse_chart(body: &str) -> Result<ChartResult, DivyieldError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| DivyieldError::fetch(format!("unexpected response: {e}")))?;

    if let Some(err) = envelope.chart.error {
        return Err(DivyieldError::fetch(format!("{}: {}", err.code, err.description)));
    }

    envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| DivyieldError::fetch("response contained no chart result"))
}

fn bars_from_chart(chart: ChartResult, range: DateRange) -> Vec<PriceBar> {
    let quote = chart
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .unwrap_or_default();
    let offset = chart.meta.gmtoffset;

    let mut bars = Vec::with_capacity(chart.timestamp.len());
    for (i, &ts) in chart.timestamp.iter().enumerate() {
        let field = |values: &[Option<f64>]| values.get(i).copied().flatten();
        let row = (
            local_date(ts, offset),
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
            quote.volume.get(i).copied().flatten(),
        );
        match row {
            (Some(date), Some(open), Some(high), Some(low), Some(close), Some(volume)) => {
                if date >= range.start && date < range.end {
                    bars.push(PriceBar {
                        date,
                        open,
                        high,
                        low,
                        close,
                        volume,
                    });
                }
            }
            _ => log::warn!("dropping incomplete bar at timestamp {ts}"),
        }
    }

    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}

fn dividends_from_chart(chart: &ChartResult) -> Vec<DividendRecord> {
    let offset = chart.meta.gmtoffset;
    let mut dividends: Vec<DividendRecord> = chart
        .events
        .iter()
        .flat_map(|events| events.dividends.values())
        .filter_map(|event| {
            Some(DividendRecord {
                date: local_date(event.date, offset)?,
                amount: event.amount,
            })
        })
        .collect();
    dividends.sort_by_key(|d| d.date);
    dividends
}

impl MarketDataPort for YahooAdapter {
    fn fetch_prices(&self, ticker: &str, range: DateRange) -> Result<Vec<PriceBar>, DivyieldError> {
        let query = [
            ("period1", epoch(range.start).to_string()),
            ("period2", epoch(range.end).to_string()),
            ("interval", "1d".to_string()),
            ("events", "div".to_string()),
        ];
        let chart = self.get_chart(ticker, &query)?;
        let bars = bars_from_chart(chart, range);
        log::info!("fetched {} price bars for {ticker}", bars.len());
        Ok(bars)
    }

    fn fetch_dividends(&self, ticker: &str) -> Result<Vec<DividendRecord>, DivyieldError> {
        let query = [
            ("range", "max".to_string()),
            ("interval", "3mo".to_string()),
            ("events", "div".to_string()),
        ];
        let chart = self.get_chart(ticker, &query)?;
        let dividends = dividends_from_chart(&chart);
        log::info!("fetched {} dividend records for {ticker}", dividends.len());
        Ok(dividends)
    }
}
