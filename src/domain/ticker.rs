//! Ticker symbol normalization.

use crate::domain::error::DivyieldError;

pub const MAX_TICKER_LEN: usize = 10;

/// Trim and upper-case a user-entered ticker, rejecting anything that is
/// not a plausible Yahoo symbol (`KO`, `0700.HK`, `BRK-B`, `^GSPC`, `USDTWD=X`).
pub fn normalize_ticker(raw: &str) -> Result<String, DivyieldError> {
    let ticker = raw.trim().to_uppercase();
    let invalid = |reason: &str| DivyieldError::InvalidTicker {
        ticker: ticker.clone(),
        reason: reason.to_string(),
    };

    if ticker.is_empty() {
        return Err(invalid("ticker is empty"));
    }
    if ticker.chars().count() > MAX_TICKER_LEN {
        return Err(invalid("longer than 10 characters"));
    }
    if let Some(c) = ticker
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')))
    {
        return Err(invalid(&format!("unexpected character {c:?}")));
    }

    Ok(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_ticker("  ko ").unwrap(), "KO");
        assert_eq!(normalize_ticker("2800.hk").unwrap(), "2800.HK");
        assert_eq!(normalize_ticker("brk-b").unwrap(), "BRK-B");
        assert_eq!(normalize_ticker("^gspc").unwrap(), "^GSPC");
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            normalize_ticker("   "),
            Err(DivyieldError::InvalidTicker { .. })
        ));
    }

    #[test]
    fn length_boundary() {
        assert!(normalize_ticker("ABCDEFGHIJ").is_ok());
        assert!(normalize_ticker("ABCDEFGHIJK").is_err());
    }

    #[test]
    fn rejects_markup() {
        let err = normalize_ticker("<b>").unwrap_err();
        assert!(err.to_string().contains("unexpected character"));
    }
}
