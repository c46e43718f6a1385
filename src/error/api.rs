//! Normalized API error.
//!
//! Every failed request ends up as exactly one [`ApiError`]. Only `code` and
//! `message` reach the client; the raw payload stays server-side for hooks
//! and diagnostic logs.

use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use serde::Serialize;

use super::BoxError;

/// Server-side diagnostic payload attached to an [`ApiError`].
pub type RawData = Arc<dyn std::error::Error + Send + Sync>;

const NOT_FOUND_MESSAGE: &str = "The requested resource wasn't found.";
const BAD_REQUEST_MESSAGE: &str = "Something went wrong while processing your request.";
const FORBIDDEN_MESSAGE: &str = "You are not allowed to perform this request.";
const UNAUTHORIZED_MESSAGE: &str = "Missing or invalid authentication token.";

/// Error value returned to API clients.
#[derive(Clone, Serialize)]
pub struct ApiError {
    code: u16,
    message: String,
    #[serde(skip)]
    raw_data: Option<RawData>,
}

impl ApiError {
    /// Create an error with an explicit status code.
    ///
    /// Codes outside the HTTP status range are replaced by 500.
    pub fn new(code: u16, message: impl AsRef<str>, raw_data: Option<BoxError>) -> Self {
        let code = if (100..=599).contains(&code) { code } else { 500 };

        Self {
            code,
            message: sentenize(message.as_ref()),
            raw_data: raw_data.map(RawData::from),
        }
    }

    pub fn not_found(message: impl AsRef<str>, raw_data: Option<BoxError>) -> Self {
        Self::new(404, or_default(message.as_ref(), NOT_FOUND_MESSAGE), raw_data)
    }

    pub fn bad_request(message: impl AsRef<str>, raw_data: Option<BoxError>) -> Self {
        Self::new(400, or_default(message.as_ref(), BAD_REQUEST_MESSAGE), raw_data)
    }

    pub fn forbidden(message: impl AsRef<str>, raw_data: Option<BoxError>) -> Self {
        Self::new(403, or_default(message.as_ref(), FORBIDDEN_MESSAGE), raw_data)
    }

    pub fn unauthorized(message: impl AsRef<str>, raw_data: Option<BoxError>) -> Self {
        Self::new(401, or_default(message.as_ref(), UNAUTHORIZED_MESSAGE), raw_data)
    }

    /// Attach an already shared raw payload.
    pub(crate) fn with_shared_raw_data(mut self, raw_data: RawData) -> Self {
        self.raw_data = Some(raw_data);
        self
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    /// The status code as a typed [`StatusCode`].
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn raw_data(&self) -> Option<&RawData> {
        self.raw_data.as_ref()
    }
}

impl fmt::Debug for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiError")
            .field("code", &self.code)
            .field("message", &self.message)
            .field("raw_data", &self.raw_data.as_ref().map(|d| d.to_string()))
            .finish()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

fn or_default<'a>(message: &'a str, default: &'a str) -> &'a str {
    if message.trim().is_empty() {
        default
    } else {
        message
    }
}

/// Trim, upper-case the first letter and terminate with a period.
fn sentenize(message: &str) -> String {
    let trimmed = message.trim();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut out: String = first.to_uppercase().chain(chars).collect();
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_messages() {
        assert_eq!(ApiError::not_found("", None).message(), NOT_FOUND_MESSAGE);
        assert_eq!(ApiError::bad_request("  ", None).message(), BAD_REQUEST_MESSAGE);
        assert_eq!(ApiError::forbidden("", None).code(), 403);
        assert_eq!(ApiError::unauthorized("", None).code(), 401);
    }

    #[test]
    fn test_message_is_sentenized() {
        let err = ApiError::new(409, " record is locked ", None);
        assert_eq!(err.message(), "Record is locked.");

        let err = ApiError::new(409, "Already done!", None);
        assert_eq!(err.message(), "Already done!");
    }

    #[test]
    fn test_invalid_code_falls_back_to_500() {
        assert_eq!(ApiError::new(42, "x", None).code(), 500);
        assert_eq!(ApiError::new(1000, "x", None).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_raw_data_is_not_serialized() {
        let err = ApiError::bad_request("invalid payload", Some("column `secret` missing".into()));
        assert!(err.raw_data().is_some());

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "code": 400, "message": "Invalid payload." })
        );
    }
}
