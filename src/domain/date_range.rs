//! Date range resolution from a day count or an explicit start/end pair.
//!
//! "Today" is always passed in by the caller so resolution is a pure
//! function of its inputs; [`local_today`] is the only clock read.

use chrono::NaiveDate;

use crate::domain::error::DivyieldError;

pub const MAX_DAY_COUNT: i64 = 3650;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Number of calendar days covered, end exclusive.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// How the user asked for a range, before it is resolved against today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    Days(i64),
    Explicit { start: NaiveDate, end: NaiveDate },
}

impl RangeRequest {
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange, DivyieldError> {
        match *self {
            RangeRequest::Days(days) => resolve_days(days, today),
            RangeRequest::Explicit { start, end } => resolve_explicit(start, end, today),
        }
    }
}

/// `end = today`, `start = today - days`.
pub fn resolve_days(days: i64, today: NaiveDate) -> Result<DateRange, DivyieldError> {
    if !(1..=MAX_DAY_COUNT).contains(&days) {
        return Err(DivyieldError::InvalidDayCount {
            days,
            max: MAX_DAY_COUNT,
        });
    }
    Ok(DateRange {
        start: today - chrono::Duration::days(days),
        end: today,
    })
}

/// Clamp `end` to today, then require `start < end`.
pub fn resolve_explicit(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<DateRange, DivyieldError> {
    let end = end.min(today);
    if start >= end {
        return Err(DivyieldError::InvalidRange { start, end });
    }
    Ok(DateRange { start, end })
}

pub fn parse_date(input: &str) -> Result<NaiveDate, DivyieldError> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| DivyieldError::InvalidDate {
        input: trimmed.to_string(),
    })
}

/// Parse the single free-form answer the command-line prompt accepts:
/// either a day count (`60`) or a start date (`2024-01-31`, end = today).
pub fn parse_range_input(input: &str, today: NaiveDate) -> Result<RangeRequest, DivyieldError> {
    let trimmed = input.trim();
    if let Ok(days) = trimmed.parse::<i64>() {
        return Ok(RangeRequest::Days(days));
    }
    let start = parse_date(trimmed)?;
    Ok(RangeRequest::Explicit { start, end: today })
}
