//! Concrete adapter implementations for ports.

pub mod chart_svg;
pub mod csv_adapter;
pub mod csv_export;
pub mod file_config_adapter;
pub mod html_report_adapter;
pub mod yahoo_adapter;

#[cfg(feature = "web")]
pub mod web;

use std::sync::Arc;

use crate::domain::error::DivyieldError;
use crate::domain::settings::ProviderSource;
use crate::ports::data_port::MarketDataPort;

/// The market data adapter selected by `[provider] source`.
pub fn build_data_port(
    source: &ProviderSource,
) -> Result<Arc<dyn MarketDataPort + Send + Sync>, DivyieldError> {
    match source {
        ProviderSource::Yahoo {
            base_url,
            user_agent,
            timeout_secs,
        } => {
            log::debug!("using Yahoo provider at {base_url}");
            Ok(Arc::new(yahoo_adapter::YahooAdapter::new(
                base_url,
                user_agent,
                *timeout_secs,
            )?))
        }
        ProviderSource::Csv { dir } => {
            log::debug!("using CSV provider in {}", dir.display());
            Ok(Arc::new(csv_adapter::CsvAdapter::new(dir.clone())))
        }
    }
}
