//! Events dispatched through the application hooks.

use crate::error::ApiError;
use crate::http::context::RequestContext;

/// Event for a single error-handling pass.
///
/// The request context is lent to the event for the duration of the pass
/// and handed back with [`ApiErrorEvent::into_context`].
pub struct ApiErrorEvent {
    pub ctx: RequestContext,
    pub error: ApiError,
}

impl ApiErrorEvent {
    pub fn new(ctx: RequestContext, error: ApiError) -> Self {
        Self { ctx, error }
    }

    pub fn into_context(self) -> RequestContext {
        self.ctx
    }
}
