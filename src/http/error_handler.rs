//! Error-handling pass.
//!
//! # Data Flow
//! ```text
//! response with PendingError
//!     → classify (ApiError)
//!     → before-error hooks → terminal write (JSON, or empty for HEAD)
//!     → after-error hooks (only if everything above succeeded)
//!     → committed response
//! ```
//!
//! # Design Decisions
//! - Commitment is checked right before every write, never twice-written
//! - Hook failures are logged in debug mode and never re-enter classification
//! - A failed write is final for the request, no retry

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::App;
use crate::error::{classify, BoxError, PendingError};
use crate::hooks::{ApiErrorEvent, HookResult};
use crate::http::context::RequestContext;

/// Runs the error pass against the application's hooks.
#[derive(Clone)]
pub struct ErrorHandler {
    app: Arc<App>,
}

impl ErrorHandler {
    pub fn new(app: Arc<App>) -> Self {
        Self { app }
    }

    /// Handle `err` for the request described by `ctx`.
    ///
    /// Returns the context, committed unless the write failed or a
    /// before-error hook stopped propagation without writing.
    pub fn handle(&self, ctx: RequestContext, err: BoxError) -> RequestContext {
        self.run(ctx, err).0
    }

    /// Turn a handler response carrying a pending error into the final
    /// error response. Other responses are returned unchanged.
    pub fn resolve(&self, ctx: RequestContext, mut response: Response) -> Response {
        let Some(err) = PendingError::take(&mut response) else {
            return response;
        };

        let (mut ctx, status) = self.run(ctx, err);
        match ctx.take_response() {
            Some(response) => response,
            None => status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR).into_response(),
        }
    }

    fn run(&self, ctx: RequestContext, err: BoxError) -> (RequestContext, Option<StatusCode>) {
        let debug = self.app.is_debug();

        if ctx.is_committed() {
            if debug {
                tracing::debug!(error = %err, "Error handler: response was already committed");
            }
            return (ctx, None);
        }

        let error = classify(err, debug);
        let mut event = ApiErrorEvent::new(ctx, error);

        match self
            .app
            .on_before_api_error()
            .trigger_with(&mut event, write_error_response)
        {
            Ok(()) => {
                if let Err(e) = self.app.on_after_api_error().trigger(&mut event) {
                    if debug {
                        tracing::debug!(error = %e, "After api error hook failed");
                    }
                }
            }
            Err(e) => {
                if debug {
                    tracing::debug!(error = %e, "Failed to send error response");
                }
            }
        }

        let status = event.error.status();
        (event.into_context(), Some(status))
    }
}

/// Terminal action of the before-error chain.
fn write_error_response(event: &mut ApiErrorEvent) -> HookResult {
    if event.ctx.is_committed() {
        return Ok(());
    }

    let status = event.error.status();
    if event.ctx.method() == Method::HEAD {
        event.ctx.no_content(status)?;
    } else {
        event.ctx.json(status, &event.error)?;
    }
    Ok(())
}

/// Middleware funnelling every failed response through the error pass.
pub async fn handle_api_errors(
    State(app): State<Arc<App>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ctx = RequestContext::from_request(&request);
    let response = next.run(request).await;
    ErrorHandler::new(app).resolve(ctx, response)
}
