//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for divyield.
///
/// Every variant is terminal for the analysis run that raised it; callers
/// report it and carry on with whatever result they already had.
#[derive(Debug, thiserror::Error)]
pub enum DivyieldError {
    #[error("invalid ticker {ticker:?}: {reason}")]
    InvalidTicker { ticker: String, reason: String },

    #[error("day count {days} out of range (expected 1..={max})")]
    InvalidDayCount { days: i64, max: i64 },

    #[error("invalid date {input:?} (expected YYYY-MM-DD)")]
    InvalidDate { input: String },

    #[error("start date {start} must be before end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("no price data for {ticker} between {start} and {end}")]
    DataUnavailable {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("data fetch failed: {reason}")]
    ExternalFetch { reason: String },

    #[error("non-positive close price {close} on {date}; cannot compute dividend yield")]
    DataQuality { date: NaiveDate, close: f64 },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DivyieldError {
    pub fn fetch(reason: impl Into<String>) -> Self {
        Self::ExternalFetch {
            reason: reason.into(),
        }
    }

    /// True for errors caused by what the user typed rather than by data.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTicker { .. }
                | Self::InvalidDayCount { .. }
                | Self::InvalidDate { .. }
                | Self::InvalidRange { .. }
        )
    }
}

impl From<&DivyieldError> for std::process::ExitCode {
    fn from(err: &DivyieldError) -> Self {
        let code: u8 = match err {
            DivyieldError::Io(_) => 1,
            DivyieldError::InvalidTicker { .. }
            | DivyieldError::InvalidDayCount { .. }
            | DivyieldError::InvalidDate { .. }
            | DivyieldError::InvalidRange { .. }
            | DivyieldError::ConfigParse { .. }
            | DivyieldError::ConfigInvalid { .. } => 2,
            DivyieldError::ExternalFetch { .. } => 3,
            DivyieldError::DataUnavailable { .. } => 4,
            DivyieldError::DataQuality { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
