//! Per-request time limit.
//!
//! Runs inside the error middleware, so an expired request is parked as a
//! 408 `HttpError` and rendered through the same classify/hooks pass as any
//! other failure.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::App;
use crate::error::{HandlerError, HttpError};

pub async fn request_timeout(
    State(app): State<Arc<App>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let limit = Duration::from_secs(app.config().timeouts.request_secs);
    let path = request.uri().path().to_string();

    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(elapsed) => {
            tracing::debug!(path = %path, limit_secs = limit.as_secs(), "request timed out");
            HandlerError::from(HttpError::new(StatusCode::REQUEST_TIMEOUT).with_internal(elapsed))
                .into_response()
        }
    }
}
