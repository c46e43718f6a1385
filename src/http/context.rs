//! Per-request context used on the error path.
//!
//! A [`RequestContext`] snapshots what the error pass needs from the
//! request (method, URI, headers, auth) and owns the response slot. Once a
//! response has been written the context is *committed* and refuses any
//! further write.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use axum::response::Response;
use serde::Serialize;
use thiserror::Error;

use crate::security::auth::AuthContext;

/// Errors raised while writing a response into a [`RequestContext`].
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("response was already committed")]
    AlreadyCommitted,

    #[error("client disconnected before the response was written")]
    Disconnected,

    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to build response: {0}")]
    Build(#[from] axum::http::Error),
}

pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    auth: Option<AuthContext>,
    response: Option<Response>,
    disconnected: bool,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
            auth: None,
            response: None,
            disconnected: false,
        }
    }

    /// Snapshot an incoming request before it is handed to the next service.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let mut ctx = Self::new(
            request.method().clone(),
            request.uri().clone(),
            request.headers().clone(),
        );
        ctx.auth = request.extensions().get::<AuthContext>().cloned();
        ctx
    }

    pub fn with_auth(mut self, auth: Option<AuthContext>) -> Self {
        self.auth = auth;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn auth(&self) -> Option<&AuthContext> {
        self.auth.as_ref()
    }

    pub fn is_committed(&self) -> bool {
        self.response.is_some()
    }

    /// Mark the client connection as gone; every later write fails.
    pub fn mark_disconnected(&mut self) {
        self.disconnected = true;
    }

    /// Write `response` unless the context is already committed.
    pub fn commit(&mut self, response: Response) -> Result<(), ResponseError> {
        self.ensure_writable()?;
        self.response = Some(response);
        Ok(())
    }

    /// Write an empty body with `status`.
    pub fn no_content(&mut self, status: StatusCode) -> Result<(), ResponseError> {
        self.ensure_writable()?;
        let response = Response::builder().status(status).body(Body::empty())?;
        self.commit(response)
    }

    /// Write `body` as JSON with `status`.
    pub fn json<T: Serialize + ?Sized>(
        &mut self,
        status: StatusCode,
        body: &T,
    ) -> Result<(), ResponseError> {
        self.ensure_writable()?;
        let bytes = serde_json::to_vec(body)?;
        let response = Response::builder()
            .status(status)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            )
            .body(Body::from(bytes))?;
        self.commit(response)
    }

    /// Take the committed response out, if any.
    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }

    fn ensure_writable(&self) -> Result<(), ResponseError> {
        if self.disconnected {
            return Err(ResponseError::Disconnected);
        }
        if self.is_committed() {
            return Err(ResponseError::AlreadyCommitted);
        }
        Ok(())
    }
}
