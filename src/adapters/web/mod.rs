//! Web dashboard adapter.
//!
//! An axum server with an HTMX front end: the analysis form posts back a
//! fragment that replaces the result panel, while plain requests get the
//! full page.

mod error;
mod handlers;
mod templates;

pub use error::{status_from_error, WebError};
pub use handlers::*;
pub use templates::*;

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use tower_http::services::ServeDir;

use crate::domain::analysis::AnalysisResult;
use crate::domain::date_range::local_today;
use crate::domain::error::DivyieldError;
use crate::domain::settings::Settings;
use crate::ports::data_port::MarketDataPort;

pub struct AppState {
    pub data_port: Arc<dyn MarketDataPort + Send + Sync>,
    pub settings: Settings,
    pub clock: fn() -> NaiveDate,
    /// The most recent successful analysis; failed runs leave it untouched.
    pub last_result: Mutex<Option<AnalysisResult>>,
}

impl AppState {
    pub fn new(data_port: Arc<dyn MarketDataPort + Send + Sync>, settings: Settings) -> Self {
        Self {
            data_port,
            settings,
            clock: local_today,
            last_result: Mutex::new(None),
        }
    }

    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    fn cache(&self) -> MutexGuard<'_, Option<AnalysisResult>> {
        self.last_result
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn last_result(&self) -> Option<AnalysisResult> {
        self.cache().clone()
    }

    pub fn store_result(&self, result: AnalysisResult) {
        *self.cache() = Some(result);
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/analyze", post(handlers::analyze))
        .route("/chart.svg", get(handlers::chart_svg))
        .route("/download.csv", get(handlers::download_csv))
        .nest_service("/static", ServeDir::new("static"))
        .fallback(handlers::not_found)
        .with_state(Arc::new(state))
}

/// Bind `listen` and serve until the process is stopped.
pub async fn serve(state: AppState, listen: &str) -> Result<(), DivyieldError> {
    let listener = tokio::net::TcpListener::bind(listen).await?;
    log::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}
