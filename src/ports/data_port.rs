//! Market data access port.

use crate::domain::date_range::DateRange;
use crate::domain::dividend::DividendRecord;
use crate::domain::error::DivyieldError;
use crate::domain::price_bar::PriceBar;

pub trait MarketDataPort {
    /// Daily bars for `ticker` from `range.start` up to but excluding
    /// `range.end`, chronological.
    fn fetch_prices(&self, ticker: &str, range: DateRange) -> Result<Vec<PriceBar>, DivyieldError>;

    /// Full dividend history for `ticker`, chronological. Empty when the
    /// instrument has never paid.
    fn fetch_dividends(&self, ticker: &str) -> Result<Vec<DividendRecord>, DivyieldError>;
}
