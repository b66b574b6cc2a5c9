//! HTTP error response handling for the API
//!
//! Every failure is a `500` with a plain-text body holding the error's
//! message on one line. No structured error schema.

use super::PLAIN_TEXT;
use crate::error::Error;
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Collapse a message onto a single line
pub(crate) fn single_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = single_line(&self.to_string());

        tracing::warn!(code = self.error_code(), error = %body, "request failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, PLAIN_TEXT)],
            body,
        )
            .into_response()
    }
}
