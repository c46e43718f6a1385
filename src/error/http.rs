//! Framework-level HTTP errors.
//!
//! [`HttpError`] is the transport error raised by routing and static file
//! serving (not found, method not allowed, ...). Unlike [`super::ApiError`]
//! it may wrap an internal cause that is only ever logged.

use axum::http::StatusCode;
use thiserror::Error;

use super::BoxError;

/// Transport error with a status code and a plain-text message.
#[derive(Debug, Error)]
#[error("code={}, message={message}", status.as_u16())]
pub struct HttpError {
    status: StatusCode,
    message: String,
    #[source]
    internal: Option<BoxError>,
}

impl HttpError {
    /// Create an error whose message is the canonical reason phrase.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            message: status.canonical_reason().unwrap_or_default().to_string(),
            internal: None,
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach the underlying cause.
    pub fn with_internal(mut self, internal: impl Into<BoxError>) -> Self {
        self.internal = Some(internal.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn internal(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.internal.as_deref()
    }
}

impl From<StatusCode> for HttpError {
    fn from(status: StatusCode) -> Self {
        Self::new(status)
    }
}
