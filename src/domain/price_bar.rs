//! Daily price bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Index of the first bar holding the highest close, if any.
pub fn first_max_close(bars: &[PriceBar]) -> Option<usize> {
    bars.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, bar)| match best {
            Some((_, close)) if bar.close <= close => best,
            _ => Some((i, bar.close)),
        })
        .map(|(i, _)| i)
}

/// Index of the first bar holding the lowest close, if any.
pub fn first_min_close(bars: &[PriceBar]) -> Option<usize> {
    bars.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, bar)| match best {
            Some((_, close)) if bar.close >= close => best,
            _ => Some((i, bar.close)),
        })
        .map(|(i, _)| i)
}
