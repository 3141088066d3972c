//! HTTP request handlers for web adapter.

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use chrono::NaiveDate;

use crate::adapters::chart_svg::render_chart_svg;
use crate::adapters::csv_export::{to_csv_string, CsvExportAdapter};
use crate::domain::analysis::{run_analysis, AnalysisRequest, AnalysisResult};
use crate::domain::date_range::{parse_date, parse_range_input, RangeRequest};
use crate::domain::error::DivyieldError;
use crate::domain::ticker::normalize_ticker;
use crate::ports::report_port::ReportPort;

use super::templates::{AnalysisFragment, FormView};
use super::{is_htmx_request, status_from_error, AppState, WebError};

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct AnalyzeForm {
    pub ticker: String,
    /// `days` or `range`.
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub days: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

impl AnalyzeForm {
    fn range_mode(&self) -> bool {
        self.mode.eq_ignore_ascii_case("range")
    }

    /// A blank end date means today.
    pub fn range_request(&self, today: NaiveDate) -> Result<RangeRequest, DivyieldError> {
        if self.range_mode() {
            let start = parse_date(&self.start_date)?;
            let end = if self.end_date.trim().is_empty() {
                today
            } else {
                parse_date(&self.end_date)?
            };
            Ok(RangeRequest::Explicit { start, end })
        } else {
            parse_range_input(&self.days, today)
        }
    }

    fn view(&self) -> FormView {
        FormView {
            ticker: self.ticker.clone(),
            range_mode: self.range_mode(),
            days: self.days.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }
}

/// Serve `request` from the cache when it matches, otherwise run the
/// pipeline on the blocking pool and store the result.
async fn analyze_cached(
    state: &Arc<AppState>,
    request: AnalysisRequest,
    today: NaiveDate,
) -> Result<AnalysisResult, DivyieldError> {
    let ticker = normalize_ticker(&request.ticker)?;
    let range = request.range.resolve(today)?;

    if let Some(cached) = state.last_result() {
        if cached.matches(&ticker, range, request.policy) {
            log::debug!("reusing cached analysis for {ticker} over {range}");
            return Ok(cached);
        }
    }

    let port = Arc::clone(&state.data_port);
    let result = tokio::task::spawn_blocking(move || run_analysis(&*port, &request, today))
        .await
        .map_err(|e| DivyieldError::Io(std::io::Error::other(e)))??;

    state.store_result(result.clone());
    Ok(result)
}

fn render_panel(
    state: &AppState,
    headers: &HeaderMap,
    form: FormView,
    outcome: Result<AnalysisResult, DivyieldError>,
) -> Result<Response, WebError> {
    let (status, error) = match &outcome {
        Ok(_) => (StatusCode::OK, String::new()),
        Err(err) => {
            log::warn!("analysis failed: {err}");
            (status_from_error(err), err.to_string())
        }
    };

    let current = match outcome {
        Ok(result) => Some(result),
        Err(_) => state.last_result(),
    };
    let fragment = AnalysisFragment::new(current.as_ref(), error);

    let html = if is_htmx_request(headers) {
        fragment.render()?
    } else {
        fragment.into_page(form).render()?
    };
    Ok((status, Html(html)).into_response())
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let today = (state.clock)();
    let settings = &state.settings;

    let outcome = match state.last_result() {
        Some(result) => Ok(result),
        None => {
            let request = AnalysisRequest {
                ticker: settings.default_ticker.clone(),
                range: RangeRequest::Days(settings.default_days),
                policy: settings.policy,
            };
            analyze_cached(&state, request, today).await
        }
    };

    let form = match &outcome {
        Ok(result) => FormView::for_days(&result.ticker, result.range.days(), Some(result.range)),
        Err(_) => FormView::for_days(&settings.default_ticker, settings.default_days, None),
    };
    render_panel(&state, &headers, form, outcome)
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<AnalyzeForm>,
) -> Result<Response, WebError> {
    let today = (state.clock)();
    let outcome = match form.range_request(today) {
        Ok(range) => {
            let request = AnalysisRequest {
                ticker: form.ticker.clone(),
                range,
                policy: state.settings.policy,
            };
            analyze_cached(&state, request, today).await
        }
        Err(err) => Err(err),
    };
    render_panel(&state, &headers, form.view(), outcome)
}

fn no_result() -> WebError {
    WebError::not_found("No analysis has been run yet")
}

pub async fn chart_svg(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    let result = state.last_result().ok_or_else(no_result)?;
    let svg = render_chart_svg(&result.chart());
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

pub async fn download_csv(State(state): State<Arc<AppState>>) -> Result<Response, WebError> {
    let result = state.last_result().ok_or_else(no_result)?;
    let body = to_csv_string(&result)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        CsvExportAdapter.file_name(&result)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}
