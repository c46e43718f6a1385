//! Request activity logging.
//!
//! Route-level middleware: failed responses are resolved in place so the
//! logged status is the one the client receives. The error middleware
//! further out then sees a committed response and leaves it alone.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::app::App;
use crate::http::context::RequestContext;
use crate::http::error_handler::ErrorHandler;
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;

pub async fn activity_logger(
    State(app): State<Arc<App>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let ctx = RequestContext::from_request(&request);
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = ctx.method().clone();
    let path = ctx.uri().path().to_string();
    let auth_id = ctx.auth().map(|a| a.id.clone());

    let response = next.run(request).await;
    let response = ErrorHandler::new(app).resolve(ctx, response);
    let status = response.status();

    if status.is_server_error() {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            auth_id = auth_id.as_deref().unwrap_or(""),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request failed"
        );
    } else {
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = status.as_u16(),
            auth_id = auth_id.as_deref().unwrap_or(""),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request handled"
        );
    }
    metrics::record_request(method.as_str(), status.as_u16(), start);

    response
}
