//! HTML templates using Askama.

use askama::Template;

use crate::adapters::chart_svg::render_chart_svg;
use crate::adapters::html_report_adapter::{
    dividend_note, row_views, summary_cards, RowView, SummaryCard,
};
use crate::domain::analysis::{AnalysisResult, TABLE_COLUMNS};
use crate::domain::date_range::DateRange;

/// Values echoed back into the analysis form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub ticker: String,
    pub range_mode: bool,
    pub days: String,
    pub start_date: String,
    pub end_date: String,
}

impl FormView {
    pub fn for_days(ticker: &str, days: i64, range: Option<DateRange>) -> Self {
        Self {
            ticker: ticker.to_string(),
            range_mode: false,
            days: days.to_string(),
            start_date: range.map(|r| r.start.to_string()).unwrap_or_default(),
            end_date: range.map(|r| r.end.to_string()).unwrap_or_default(),
        }
    }
}

/// Everything the result panel shows, pre-formatted.
#[derive(Default)]
pub struct AnalysisView {
    pub ticker: String,
    pub range: String,
    pub cards: Vec<SummaryCard>,
    pub chart_svg: String,
    pub note: String,
    pub rows: Vec<RowView>,
}

impl AnalysisView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            ticker: result.ticker.clone(),
            range: result.range.to_string(),
            cards: summary_cards(result),
            chart_svg: render_chart_svg(&result.chart()),
            note: dividend_note(result),
            rows: row_views(result),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub title: String,
    pub form: FormView,
    pub error: String,
    pub has_result: bool,
    pub view: AnalysisView,
    pub columns: &'static [&'static str],
}

/// The result panel alone, swapped in by HTMX.
#[derive(Template)]
#[template(path = "analysis.html")]
pub struct AnalysisFragment {
    pub error: String,
    pub has_result: bool,
    pub view: AnalysisView,
    pub columns: &'static [&'static str],
}

impl AnalysisFragment {
    pub fn new(result: Option<&AnalysisResult>, error: String) -> Self {
        Self {
            error,
            has_result: result.is_some(),
            view: result.map(AnalysisView::from_result).unwrap_or_default(),
            columns: &TABLE_COLUMNS,
        }
    }

    pub fn into_page(self, form: FormView) -> DashboardTemplate {
        let title = if self.has_result {
            format!("{} Dividend Yield", self.view.ticker)
        } else {
            "Dividend Yield".to_string()
        };
        DashboardTemplate {
            title,
            form,
            error: self.error,
            has_result: self.has_result,
            view: self.view,
            columns: self.columns,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}
