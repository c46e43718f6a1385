//! Request pre-processing.
//!
//! # Responsibilities
//! - Remove a trailing slash from API paths before routing
//! - Generate a unique request ID (UUID v4)
//!
//! # Design Decisions
//! - Only paths under the API mount are rewritten; static and UI paths
//!   pass through untouched
//! - The path is rewritten in place, no redirect is issued
//! - Request ID added as early as possible for tracing

use axum::{
    body::Body,
    http::{uri::PathAndQuery, HeaderName, Request, Uri},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::routing::API_MOUNT;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Drop one trailing slash from paths under the API mount.
///
/// `/api/records/?page=2` becomes `/api/records?page=2`; `/ui/` is left as is.
pub fn remove_trailing_slash(mut request: Request<Body>) -> Request<Body> {
    if let Some(uri) = trimmed_api_uri(request.uri()) {
        tracing::trace!(from = %request.uri(), to = %uri, "Removed trailing slash");
        *request.uri_mut() = uri;
    }
    request
}

fn trimmed_api_uri(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    if !is_api_path(path) || !path.ends_with('/') {
        return None;
    }

    let trimmed = &path[..path.len() - 1];
    let path_and_query = match uri.query() {
        Some(query) => format!("{trimmed}?{query}"),
        None => trimmed.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}

fn is_api_path(path: &str) -> bool {
    path.strip_prefix(API_MOUNT)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Request ID generator producing random UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestUuid;

impl MakeRequestId for RequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}
