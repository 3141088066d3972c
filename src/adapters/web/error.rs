//! HTTP error responses for web adapter.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::domain::error::DivyieldError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<DivyieldError> for WebError {
    fn from(err: DivyieldError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl From<askama::Error> for WebError {
    fn from(err: askama::Error) -> Self {
        Self::internal(format!("template error: {err}"))
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let template = super::templates::ErrorTemplate {
            message: &self.message,
            status: self.status.as_u16(),
        };
        match template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(_) => (self.status, self.message).into_response(),
        }
    }
}

pub fn status_from_error(err: &DivyieldError) -> StatusCode {
    match err {
        e if e.is_input_error() => StatusCode::BAD_REQUEST,
        DivyieldError::DataUnavailable { .. } | DivyieldError::DataQuality { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        DivyieldError::ExternalFetch { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn statuses_follow_error_class() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(
            status_from_error(&DivyieldError::InvalidDate { input: "x".into() }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_from_error(&DivyieldError::InvalidTicker {
                ticker: "".into(),
                reason: "empty".into(),
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_from_error(&DivyieldError::ConfigInvalid {
                section: "analysis".into(),
                key: "days".into(),
                reason: "bad".into(),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_from_error(&DivyieldError::DataUnavailable {
                ticker: "KO".into(),
                start: day,
                end: day,
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_from_error(&DivyieldError::DataQuality { date: day, close: 0.0 }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_from_error(&DivyieldError::fetch("timeout")),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_from_error(&DivyieldError::Io(std::io::Error::other("disk"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_page_carries_status() {
        let response = WebError::not_found("nothing here").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
