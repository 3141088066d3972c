#![allow(dead_code)]

use chrono::NaiveDate;
use divyield::domain::date_range::DateRange;
pub use divyield::domain::dividend::DividendRecord;
use divyield::domain::error::DivyieldError;
pub use divyield::domain::price_bar::PriceBar;
use divyield::ports::data_port::MarketDataPort;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory market data with per-ticker bars, dividends and injected
/// failures. Counts price fetches so tests can observe cache reuse.
pub struct MockDataPort {
    pub bars: HashMap<String, Vec<PriceBar>>,
    pub dividends: HashMap<String, Vec<DividendRecord>>,
    pub errors: HashMap<String, String>,
    price_calls: AtomicUsize,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            dividends: HashMap::new(),
            errors: HashMap::new(),
            price_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.bars.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_dividends(mut self, ticker: &str, dividends: Vec<DividendRecord>) -> Self {
        self.dividends.insert(ticker.to_string(), dividends);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }

    pub fn price_calls(&self) -> usize {
        self.price_calls.load(Ordering::SeqCst)
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_prices(&self, ticker: &str, range: DateRange) -> Result<Vec<PriceBar>, DivyieldError> {
        self.price_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(ticker) {
            return Err(DivyieldError::fetch(reason.clone()));
        }
        Ok(self
            .bars
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= range.start && b.date < range.end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_dividends(&self, ticker: &str) -> Result<Vec<DividendRecord>, DivyieldError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(DivyieldError::fetch(reason.clone()));
        }
        Ok(self.dividends.get(ticker).cloned().unwrap_or_default())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn make_bar(date_str: &str, close: f64) -> PriceBar {
    PriceBar {
        date: date(date_str),
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 10_000,
    }
}

/// `count` consecutive daily bars from `start`, close rising by 0.5 a day.
pub fn generate_bars(start: &str, count: usize, base_close: f64) -> Vec<PriceBar> {
    let start_date = date(start);
    (0..count)
        .map(|i| {
            let close = base_close + i as f64 * 0.5;
            PriceBar {
                date: start_date + chrono::Duration::days(i as i64),
                open: close - 0.25,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000 + i as i64,
            }
        })
        .collect()
}

/// Quarterly payments of `amount` in each of `years`.
pub fn quarterly_dividends(years: &[i32], amount: f64) -> Vec<DividendRecord> {
    years
        .iter()
        .flat_map(|&year| {
            [3, 6, 9, 12].map(|month| DividendRecord {
                date: NaiveDate::from_ymd_opt(year, month, 15).unwrap(),
                amount,
            })
        })
        .collect()
}
