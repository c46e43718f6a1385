//! Error carrier for route handlers.
//!
//! Handlers return `Result<T, HandlerError>`. Converting the error into a
//! response does not render anything yet: the error is parked in the
//! response extensions and picked up by the error-handling middleware,
//! which has the request context needed to classify and write it.

use std::fmt;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::BoxError;

/// The "no matching record" condition raised by storage collaborators.
#[derive(Debug, Clone, Copy, Default, Error)]
#[error("no matching record found")]
pub struct RecordNotFound;

/// A panic recovered from a handler.
#[derive(Debug, Error)]
#[error("[PANIC RECOVER] {0}")]
pub struct PanicError(pub String);

/// Failure returned by a route handler.
///
/// Any `std::error::Error + Send + Sync` converts into it with `?`; plain
/// strings go through [`HandlerError::new`]. It does not implement
/// `std::error::Error` itself.
pub struct HandlerError(BoxError);

impl HandlerError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }

    pub fn into_inner(self) -> BoxError {
        self.0
    }
}

impl<E> From<E> for HandlerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self(Box::new(err))
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(PendingError::new(self.0));
        response
    }
}

/// An unhandled error travelling back up the middleware stack.
#[derive(Clone)]
pub struct PendingError(Arc<Mutex<Option<BoxError>>>);

impl PendingError {
    fn new(err: BoxError) -> Self {
        Self(Arc::new(Mutex::new(Some(err))))
    }

    /// Take the error out of a response, leaving the response clean.
    pub fn take(response: &mut Response) -> Option<BoxError> {
        let pending = response.extensions_mut().remove::<PendingError>()?;
        let mut slot = pending.0.lock().ok()?;
        slot.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing() -> Result<(), HandlerError> {
        Err(RecordNotFound)?
    }

    #[test]
    fn test_question_mark_conversion() {
        let err = failing().unwrap_err().into_inner();
        assert!(err.downcast_ref::<RecordNotFound>().is_some());
    }

    #[test]
    fn test_error_is_parked_in_response() {
        let mut response = HandlerError::new("boom").into_response();
        let err = PendingError::take(&mut response).expect("pending error");
        assert_eq!(err.to_string(), "boom");

        // Taking twice yields nothing.
        assert!(PendingError::take(&mut response).is_none());
    }
}
