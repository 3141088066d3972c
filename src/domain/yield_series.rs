//! Per-day dividend yield series.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::domain::dividend::{select_dividend_year, AnnualDividendSelection, DividendRecord};
use crate::domain::error::DivyieldError;
use crate::domain::price_bar::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldPoint {
    pub date: NaiveDate,
    pub yield_percent: f64,
}

/// Yield percentages aligned 1:1 with the bars they were computed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YieldSeries {
    points: Vec<YieldPoint>,
}

impl YieldSeries {
    pub fn from_points(points: Vec<YieldPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[YieldPoint] {
        &self.points
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.yield_percent)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn min(&self) -> Option<f64> {
        self.values().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values().reduce(f64::max)
    }

    /// Whether any bar was priced against a non-zero dividend.
    pub fn any_positive(&self) -> bool {
        self.values().any(|v| v > 0.0)
    }

    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.values().fold(0.0, |acc, v| acc + v) / self.points.len() as f64)
    }
}

/// Which dividend figure each bar's yield is computed against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum YieldPolicy {
    /// One annual figure, selected for the range end date, applied to every
    /// bar. An approximation for ranges that span several dividend years.
    #[default]
    Static,
    /// Each bar uses the annual figure selected for its own date.
    PerYear,
}

impl fmt::Display for YieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YieldPolicy::Static => f.write_str("static"),
            YieldPolicy::PerYear => f.write_str("per-year"),
        }
    }
}

impl FromStr for YieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(YieldPolicy::Static),
            "per-year" | "per_year" | "peryear" => Ok(YieldPolicy::PerYear),
            other => Err(format!("unknown yield policy {other:?} (expected static or per-year)")),
        }
    }
}

fn yield_for(bar: &PriceBar, annual_dividend: f64) -> Result<f64, DivyieldError> {
    if bar.close.is_nan() || bar.close <= 0.0 {
        return Err(DivyieldError::DataQuality {
            date: bar.date,
            close: bar.close,
        });
    }
    Ok(annual_dividend / bar.close * 100.0)
}

/// `yield = annual_dividend / close * 100` for every bar.
///
/// A zero, negative or NaN close is a data-quality error, never an
/// infinite yield.
pub fn build_yield_series(
    bars: &[PriceBar],
    annual_dividend: f64,
) -> Result<YieldSeries, DivyieldError> {
    let points = bars
        .iter()
        .map(|bar| {
            Ok(YieldPoint {
                date: bar.date,
                yield_percent: yield_for(bar, annual_dividend)?,
            })
        })
        .collect::<Result<Vec<_>, DivyieldError>>()?;
    Ok(YieldSeries { points })
}

/// Like [`build_yield_series`] but re-selects the dividend year per bar.
pub fn build_per_year_series(
    bars: &[PriceBar],
    dividends: &[DividendRecord],
) -> Result<YieldSeries, DivyieldError> {
    let mut by_year: BTreeMap<i32, AnnualDividendSelection> = BTreeMap::new();
    let points = bars
        .iter()
        .map(|bar| {
            // the selection only depends on the bar's calendar year
            let selection = *by_year
                .entry(bar.date.year())
                .or_insert_with(|| select_dividend_year(dividends, bar.date));
            Ok(YieldPoint {
                date: bar.date,
                yield_percent: yield_for(bar, selection.total)?,
            })
        })
        .collect::<Result<Vec<_>, DivyieldError>>()?;
    Ok(YieldSeries { points })
}
