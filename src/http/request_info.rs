//! Cached request info for API handlers.
//!
//! [`eager_request_info`] runs on the `/api` routes. For methods that carry
//! a body it buffers the body once, parses it into [`RequestInfo::data`]
//! and puts the body back, so both the cached info and the handler's own
//! body extractor see the same bytes. Other methods build the info lazily
//! through the [`RequestInfo`] extractor.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, FromRequestParts, Query, State},
    http::{header, request::Parts, HeaderMap, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
    Form,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::app::App;
use crate::error::{HandlerError, HttpError};
use crate::security::auth::AuthContext;

/// Method, query, headers, parsed body and identity of a request.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RequestInfo {
    pub method: String,
    pub query: Map<String, Value>,
    pub data: Map<String, Value>,
    /// Lowercased names with `-` replaced by `_`.
    pub headers: Map<String, Value>,
    #[serde(skip)]
    pub auth: Option<AuthContext>,
}

impl RequestInfo {
    /// Everything except the body.
    pub fn from_parts(parts: &Parts) -> Self {
        let mut query = Map::new();
        if let Ok(Query(pairs)) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
            insert_first(&mut query, pairs);
        }

        Self {
            method: parts.method.to_string(),
            query,
            data: Map::new(),
            headers: header_map(&parts.headers),
            auth: parts.extensions.get::<AuthContext>().cloned(),
        }
    }
}

impl<S> FromRequestParts<S> for RequestInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(info) = parts.extensions.get::<Arc<RequestInfo>>() {
            return Ok(info.as_ref().clone());
        }
        let info = Arc::new(RequestInfo::from_parts(parts));
        parts.extensions.insert(info.clone());
        Ok(info.as_ref().clone())
    }
}

pub async fn eager_request_info(
    State(app): State<Arc<App>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    if !carries_body(request.method()) {
        return Ok(next.run(request).await);
    }

    let limit = app.config().security.max_body_size;
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(HttpError::new(StatusCode::PAYLOAD_TOO_LARGE).into());
    }

    let (mut parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, limit).await?;

    let mut info = RequestInfo::from_parts(&parts);
    info.data = parse_body(&parts.headers, &bytes).await;
    parts.extensions.insert(Arc::new(info));

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

fn carries_body(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn header_map(headers: &HeaderMap) -> Map<String, Value> {
    let mut map = Map::new();
    for name in headers.keys() {
        let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) else {
            continue;
        };
        map.insert(name.as_str().replace('-', "_"), Value::String(value.to_string()));
    }
    map
}

fn insert_first(map: &mut Map<String, Value>, pairs: Vec<(String, String)>) {
    for (key, value) in pairs {
        map.entry(key).or_insert(Value::String(value));
    }
}

/// JSON objects and urlencoded forms; anything else yields no data.
async fn parse_body(headers: &HeaderMap, bytes: &Bytes) -> Map<String, Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let mut data = Map::new();

    if content_type.starts_with("application/json") {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(object)) => data = object,
            Ok(_) => {}
            Err(e) => tracing::trace!(error = %e, "Request body is not a JSON object"),
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let form = Request::post("/")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(bytes.clone()));
        if let Ok(request) = form {
            match Form::<Vec<(String, String)>>::from_request(request, &()).await {
                Ok(Form(pairs)) => insert_first(&mut data, pairs),
                Err(e) => tracing::trace!(error = %e, "Request body is not a valid form"),
            }
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::{middleware::from_fn_with_state, routing::any, Json, Router};
    use serde_json::json;
    use tower::ServiceExt;

    fn router(max_body_size: usize) -> Router {
        let mut config = AppConfig::default();
        config.security.max_body_size = max_body_size;
        let app = Arc::new(App::new(config));

        Router::new()
            .route(
                "/echo",
                any(|info: RequestInfo, body: String| async move {
                    Json(json!({"info": info, "body": body}))
                }),
            )
            .layer(from_fn_with_state(app.clone(), eager_request_info))
            .with_state(app)
    }

    async fn call(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_json_body_is_cached_and_still_readable() {
        let request = Request::post("/echo?page=2&page=3")
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Trace-Id", "t1")
            .body(Body::from(r#"{"title":"hello"}"#))
            .unwrap();

        let (status, body) = call(router(1024), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["info"]["method"], "POST");
        assert_eq!(body["info"]["data"], json!({"title": "hello"}));
        assert_eq!(body["info"]["query"], json!({"page": "2"}));
        assert_eq!(body["info"]["headers"]["x_trace_id"], "t1");
        assert_eq!(body["body"], r#"{"title":"hello"}"#);
    }

    #[tokio::test]
    async fn test_form_body_is_parsed() {
        let request = Request::patch("/echo")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("name=a+b&tag=x%26y"))
            .unwrap();

        let (_, body) = call(router(1024), request).await;
        assert_eq!(body["info"]["data"], json!({"name": "a b", "tag": "x&y"}));
        assert_eq!(body["body"], "name=a+b&tag=x%26y");
    }

    #[tokio::test]
    async fn test_get_builds_info_without_body() {
        let request = Request::get("/echo?q=1").body(Body::empty()).unwrap();

        let (_, body) = call(router(1024), request).await;
        assert_eq!(body["info"]["method"], "GET");
        assert_eq!(body["info"]["query"], json!({"q": "1"}));
        assert_eq!(body["info"]["data"], json!({}));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let request = Request::post("/echo")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, "64")
            .body(Body::from(vec![b' '; 64]))
            .unwrap();

        let mut response = router(16).oneshot(request).await.unwrap();
        let err = crate::error::PendingError::take(&mut response).unwrap();
        let err = err.downcast_ref::<HttpError>().unwrap();
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
