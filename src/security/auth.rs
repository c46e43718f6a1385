//! Auth-context loading middleware.
//!
//! Resolving a token into an identity belongs to an external collaborator
//! behind [`AuthLoader`]. This layer only extracts the token, asks the
//! loader, and attaches the result to the request so that route-group
//! middleware can authorize against it.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::app::App;

/// Identity attached to authenticated requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthContext {
    pub id: String,
    /// Auth collection of a record identity, `None` for admins.
    pub collection: Option<String>,
}

impl AuthContext {
    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection: None,
        }
    }

    pub fn record(id: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            collection: Some(collection.into()),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.collection.is_none()
    }
}

/// Resolves a raw auth token into an identity.
pub trait AuthLoader: Send + Sync {
    /// Returns `None` for unknown, expired or malformed tokens.
    fn load(&self, token: &str) -> Option<AuthContext>;
}

/// Loader that never authenticates anyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl AuthLoader for NoAuth {
    fn load(&self, _token: &str) -> Option<AuthContext> {
        None
    }
}

impl<F> AuthLoader for F
where
    F: Fn(&str) -> Option<AuthContext> + Send + Sync,
{
    fn load(&self, token: &str) -> Option<AuthContext> {
        self(token)
    }
}

/// Extract the token from the `Authorization` header.
///
/// The `Bearer ` prefix is optional.
pub fn auth_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

pub async fn load_auth_context(
    State(app): State<Arc<App>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = auth_token(request.headers()) {
        match app.auth_loader().load(token) {
            Some(ctx) => {
                tracing::trace!(auth_id = %ctx.id, admin = ctx.is_admin(), "Auth context loaded");
                request.extensions_mut().insert(ctx);
            }
            None => tracing::trace!("Auth token rejected by loader"),
        }
    }

    next.run(request).await
}
