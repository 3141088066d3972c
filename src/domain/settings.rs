//! Runtime settings read through [`ConfigPort`].
//!
//! Every key is optional; a missing config file yields the defaults below.

use std::path::PathBuf;

use crate::domain::date_range::MAX_DAY_COUNT;
use crate::domain::error::DivyieldError;
use crate::domain::ticker::normalize_ticker;
use crate::domain::yield_series::YieldPolicy;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_TICKER: &str = "KO";
pub const DEFAULT_DAYS: i64 = 60;
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; divyield/0.1)";
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;
pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSource {
    Yahoo {
        base_url: String,
        user_agent: String,
        timeout_secs: u64,
    },
    Csv {
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub provider: ProviderSource,
    pub default_ticker: String,
    pub default_days: i64,
    pub policy: YieldPolicy,
    pub output_dir: PathBuf,
    pub export_csv: bool,
    pub export_html: bool,
    pub listen: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: ProviderSource::Yahoo {
                base_url: DEFAULT_BASE_URL.to_string(),
                user_agent: DEFAULT_USER_AGENT.to_string(),
                timeout_secs: DEFAULT_TIMEOUT_SECS as u64,
            },
            default_ticker: DEFAULT_TICKER.to_string(),
            default_days: DEFAULT_DAYS,
            policy: YieldPolicy::Static,
            output_dir: PathBuf::from("."),
            export_csv: true,
            export_html: true,
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> DivyieldError {
    DivyieldError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: reason.into(),
    }
}

fn build_provider(config: &dyn ConfigPort) -> Result<ProviderSource, DivyieldError> {
    let source = config
        .get_string("provider", "source")
        .unwrap_or_else(|| "yahoo".to_string());

    match source.trim().to_lowercase().as_str() {
        "yahoo" => {
            let timeout = config
                .get_int("provider", "timeout_secs", DEFAULT_TIMEOUT_SECS)
                .map_err(|e| invalid("provider", "timeout_secs", e))?;
            if timeout <= 0 {
                return Err(invalid("provider", "timeout_secs", "must be positive"));
            }
            Ok(ProviderSource::Yahoo {
                base_url: config
                    .get_string("provider", "base_url")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                user_agent: config
                    .get_string("provider", "user_agent")
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
                timeout_secs: timeout as u64,
            })
        }
        "csv" => {
            let dir = config
                .get_string("provider", "csv_dir")
                .filter(|d| !d.trim().is_empty())
                .ok_or_else(|| invalid("provider", "csv_dir", "required when source = csv"))?;
            Ok(ProviderSource::Csv {
                dir: PathBuf::from(dir),
            })
        }
        other => Err(invalid(
            "provider",
            "source",
            format!("unknown source {other:?} (expected yahoo or csv)"),
        )),
    }
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<Settings, DivyieldError> {
    let provider = build_provider(config)?;

    let default_ticker = match config.get_string("analysis", "ticker") {
        Some(raw) => normalize_ticker(&raw).map_err(|e| invalid("analysis", "ticker", e.to_string()))?,
        None => DEFAULT_TICKER.to_string(),
    };

    let default_days = config
        .get_int("analysis", "days", DEFAULT_DAYS)
        .map_err(|e| invalid("analysis", "days", e))?;
    if !(1..=MAX_DAY_COUNT).contains(&default_days) {
        return Err(invalid(
            "analysis",
            "days",
            format!("must be between 1 and {MAX_DAY_COUNT}"),
        ));
    }

    let policy = match config.get_string("analysis", "yield_policy") {
        Some(raw) => raw
            .parse::<YieldPolicy>()
            .map_err(|e| invalid("analysis", "yield_policy", e))?,
        None => YieldPolicy::Static,
    };

    let export_csv = config
        .get_bool("output", "csv", true)
        .map_err(|e| invalid("output", "csv", e))?;
    let export_html = config
        .get_bool("output", "html", true)
        .map_err(|e| invalid("output", "html", e))?;

    Ok(Settings {
        provider,
        default_ticker,
        default_days,
        policy,
        output_dir: config
            .get_string("output", "dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
        export_csv,
        export_html,
        listen: config
            .get_string("web", "listen")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string()),
    })
}
