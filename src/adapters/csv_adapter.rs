//! Offline market data from CSV files.
//!
//! A directory holds `{TICKER}_prices.csv` (`date,open,high,low,close,volume`)
//! and optionally `{TICKER}_dividends.csv` (`date,amount`).

use crate::domain::date_range::{DateRange, DATE_FORMAT};
use crate::domain::dividend::DividendRecord;
use crate::domain::error::DivyieldError;
use crate::domain::price_bar::PriceBar;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

pub struct CsvAdapter {
    base_path: PathBuf,
}

fn field<T: FromStr>(record: &csv::StringRecord, index: usize, name: &str) -> Result<T, DivyieldError>
where
    T::Err: std::fmt::Display,
{
    let raw = record
        .get(index)
        .ok_or_else(|| DivyieldError::fetch(format!("missing {name} column")))?;
    raw.trim()
        .parse()
        .map_err(|e| DivyieldError::fetch(format!("invalid {name} value {raw:?}: {e}")))
}

fn date_field(record: &csv::StringRecord) -> Result<NaiveDate, DivyieldError> {
    let raw = record
        .get(0)
        .ok_or_else(|| DivyieldError::fetch("missing date column"))?;
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|e| DivyieldError::fetch(format!("invalid date {raw:?}: {e}")))
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn prices_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}_prices.csv"))
    }

    fn dividends_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{ticker}_dividends.csv"))
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_prices(&self, ticker: &str, range: DateRange) -> Result<Vec<PriceBar>, DivyieldError> {
        let path = self.prices_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| {
            DivyieldError::fetch(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record =
                result.map_err(|e| DivyieldError::fetch(format!("CSV parse error: {e}")))?;

            let date = date_field(&record)?;
            if date < range.start || date >= range.end {
                continue;
            }

            bars.push(PriceBar {
                date,
                open: field(&record, 1, "open")?,
                high: field(&record, 2, "high")?,
                low: field(&record, 3, "low")?,
                close: field(&record, 4, "close")?,
                volume: field(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        log::info!("read {} price bars for {ticker} from {}", bars.len(), path.display());
        Ok(bars)
    }

    fn fetch_dividends(&self, ticker: &str) -> Result<Vec<DividendRecord>, DivyieldError> {
        let path = self.dividends_path(ticker);
        if !path.exists() {
            log::debug!("no dividend file for {ticker} at {}", path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            DivyieldError::fetch(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut dividends = Vec::new();
        for result in rdr.records() {
            let record =
                result.map_err(|e| DivyieldError::fetch(format!("CSV parse error: {e}")))?;
            dividends.push(DividendRecord {
                date: date_field(&record)?,
                amount: field(&record, 1, "amount")?,
            });
        }

        dividends.sort_by_key(|d| d.date);
        Ok(dividends)
    }
}
