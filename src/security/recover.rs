//! Panic recovery.
//!
//! A panicking handler must not take the connection down with it. The
//! panic payload is turned into a [`PanicError`] and parked on the response
//! like any other handler failure, so it goes through classification and
//! the error hooks.

use std::any::Any;

use axum::{
    body::Body,
    http::Response,
    response::IntoResponse,
};
use tower_http::catch_panic::{CatchPanicLayer, ResponseForPanic};

use crate::error::{HandlerError, PanicError};

#[derive(Debug, Clone, Copy, Default)]
pub struct RecoverPanic;

impl ResponseForPanic for RecoverPanic {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let message = panic_message(err.as_ref());
        tracing::error!(panic = %message, "Recovered from handler panic");
        HandlerError::from(PanicError(message)).into_response()
    }
}

/// Layer converting handler panics into pipeline errors.
pub fn recover_layer() -> CatchPanicLayer<RecoverPanic> {
    CatchPanicLayer::custom(RecoverPanic)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PendingError;

    #[test]
    fn test_panic_becomes_pending_error() {
        let mut response = RecoverPanic.response_for_panic(Box::new("index out of bounds"));
        let err = PendingError::take(&mut response).expect("pending error");

        assert!(err.downcast_ref::<PanicError>().is_some());
        assert_eq!(err.to_string(), "[PANIC RECOVER] index out of bounds");
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic payload");
    }
}
