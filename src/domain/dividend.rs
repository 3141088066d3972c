//! Dividend history and annual dividend selection.
//!
//! The selector prefers the reference date's own calendar year as soon as
//! it has at least one payment, even if the year is not over yet, and only
//! then falls back to the previous year. With no payments in either year
//! the selection degenerates to a zero total rather than an error.

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct DividendRecord {
    pub date: NaiveDate,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnualDividendSelection {
    pub year: i32,
    pub total: f64,
}

impl AnnualDividendSelection {
    pub fn pays_dividend(&self) -> bool {
        self.total > 0.0
    }
}

/// Sum of all payments dated within `year`.
pub fn total_for_year(dividends: &[DividendRecord], year: i32) -> f64 {
    dividends
        .iter()
        .filter(|d| d.date.year() == year)
        .fold(0.0, |acc, d| acc + d.amount)
}

pub fn select_dividend_year(
    dividends: &[DividendRecord],
    reference_date: NaiveDate,
) -> AnnualDividendSelection {
    let current_year = reference_date.year();
    let current_total = total_for_year(dividends, current_year);
    if current_total > 0.0 {
        return AnnualDividendSelection {
            year: current_year,
            total: current_total,
        };
    }

    let previous_year = current_year - 1;
    AnnualDividendSelection {
        year: previous_year,
        total: total_for_year(dividends, previous_year),
    }
}
