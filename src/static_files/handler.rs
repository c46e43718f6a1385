//! Static asset handler.
//!
//! # Data Flow
//! ```text
//! raw (still escaped) wildcard suffix
//!     → percent-decode (malformed escape or bad UTF-8 → StaticError, 400)
//!     → clean_name (never above the root)
//!     → StaticFs::open
//!     → missing: index.html when falling back, else HttpError 404
//! ```

use std::borrow::Cow;
use std::io;
use std::string::FromUtf8Error;
use std::sync::Arc;

use axum::{
    extract::MatchedPath,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, MethodRouter},
};
use thiserror::Error;

use super::fs::{StaticFile, StaticFs, INDEX_FILE};
use super::path::clean_name;
use crate::app::App;
use crate::error::{HandlerError, HttpError};

#[derive(Debug, Error)]
pub enum StaticError {
    #[error("failed to unescape path variable: {0}")]
    Unescape(#[from] FromUtf8Error),
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),
}

/// Handler serving files from `fs`.
///
/// Mount it on both `{prefix}/{*path}` and `{prefix}` (or `/`); a route
/// without a wildcard serves the root. With
/// `index_fallback`, a missing file answers with `index.html` so client-side
/// routed apps can own their URLs.
pub fn static_directory_handler(
    fs: Arc<dyn StaticFs>,
    index_fallback: bool,
) -> MethodRouter<Arc<App>> {
    any(move |matched: MatchedPath, uri: Uri| {
        let fs = fs.clone();
        async move { serve(fs.as_ref(), raw_suffix(&matched, &uri), index_fallback).await }
    })
}

/// The part of the request path captured by the route's wildcard, exactly
/// as sent by the client. Route literals match the escaped path, so the
/// literal prefix of the pattern can be stripped as is.
fn raw_suffix<'a>(matched: &MatchedPath, uri: &'a Uri) -> &'a str {
    let pattern = matched.as_str();
    match pattern.find("{*") {
        Some(idx) => uri.path().strip_prefix(&pattern[..idx]).unwrap_or_default(),
        None => "",
    }
}

async fn serve(fs: &dyn StaticFs, raw: &str, index_fallback: bool) -> Result<Response, HandlerError> {
    let decoded = unescape(raw)?;
    let name = clean_name(&decoded);

    match fs.open(&name).await {
        Ok(file) => Ok(file_response(file)),
        Err(e) if index_fallback => {
            tracing::trace!(name = %name, error = %e, "Static file missing, serving index");
            let file = fs.open(INDEX_FILE).await.map_err(not_found)?;
            Ok(file_response(file))
        }
        Err(e) => Err(not_found(e).into()),
    }
}

/// Percent-decode `raw`. Every `%` must start a two hex digit escape.
fn unescape(raw: &str) -> Result<Cow<'_, str>, StaticError> {
    let bytes = raw.as_bytes();
    for (idx, _) in raw.match_indices('%') {
        let escape = bytes.get(idx + 1..idx + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            let end = (idx + 3).min(raw.len());
            return Err(StaticError::InvalidEscape(
                String::from_utf8_lossy(&bytes[idx..end]).into_owned(),
            ));
        }
    }
    Ok(urlencoding::decode(raw)?)
}

fn not_found(err: io::Error) -> HttpError {
    HttpError::not_found().with_internal(err)
}

fn file_response(file: StaticFile) -> Response {
    let content_type = HeaderValue::from_static(file.content_type());
    let mut response = (StatusCode::OK, file.body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    if let Some(len) = file.len {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::PendingError;
    use crate::static_files::MemoryFs;
    use axum::{body::Body, http::Request, Router};
    use tower::ServiceExt;

    fn router(index_fallback: bool) -> Router {
        let fs: Arc<dyn StaticFs> = Arc::new(
            MemoryFs::new()
                .with_file("index.html", "<app/>")
                .with_file("assets/app.css", "body{}")
                .with_file("a b.txt", "spaced"),
        );
        let handler = static_directory_handler(fs, index_fallback);
        Router::new()
            .route("/", handler.clone())
            .route("/{*path}", handler)
            .with_state(Arc::new(App::new(AppConfig::default())))
    }

    async fn get(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_files_with_content_type() {
        let response = get(router(false), "/assets/app.css").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/css; charset=utf-8"
        );
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "6");
        assert_eq!(text(response).await, "body{}");
    }

    #[tokio::test]
    async fn test_root_and_escaped_names() {
        assert_eq!(text(get(router(false), "/").await).await, "<app/>");
        assert_eq!(text(get(router(false), "/a%20b.txt").await).await, "spaced");
    }

    #[tokio::test]
    async fn test_missing_file_with_fallback_serves_index() {
        let response = get(router(true), "/dashboard/settings").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, "<app/>");
    }

    #[tokio::test]
    async fn test_missing_file_without_fallback_is_pending_404() {
        let mut response = get(router(false), "/missing.js").await;
        let err = PendingError::take(&mut response).unwrap();
        let err = err.downcast_ref::<HttpError>().unwrap();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_escapes_are_decoded_once() {
        let fs: Arc<dyn StaticFs> = Arc::new(MemoryFs::new().with_file("%41.txt", "literal"));
        let handler = static_directory_handler(fs, false);
        let router = Router::new()
            .route("/files/{*path}", handler)
            .with_state(Arc::new(App::new(AppConfig::default())));

        let response = get(router, "/files/%2541.txt").await;
        assert_eq!(text(response).await, "literal");
    }

    #[tokio::test]
    async fn test_missing_index_with_fallback_is_pending_404() {
        let fs: Arc<dyn StaticFs> = Arc::new(MemoryFs::new().with_file("app.js", "run()"));
        let handler = static_directory_handler(fs, true);
        let router = Router::new()
            .route("/", handler.clone())
            .route("/{*path}", handler)
            .with_state(Arc::new(App::new(AppConfig::default())));

        let mut response = get(router, "/dashboard").await;
        let err = PendingError::take(&mut response).unwrap();
        let err = err.downcast_ref::<HttpError>().unwrap();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_escape_is_pending_error() {
        for index_fallback in [false, true] {
            for uri in ["/bad%zz", "/bad%", "/bad%4"] {
                let mut response = get(router(index_fallback), uri).await;
                let err = PendingError::take(&mut response).unwrap();
                assert!(
                    matches!(err.downcast_ref::<StaticError>(), Some(StaticError::InvalidEscape(_))),
                    "{uri} fallback={index_fallback}"
                );
            }
        }
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a%20b.txt").unwrap(), "a b.txt");
        assert_eq!(unescape("plain").unwrap(), "plain");
        assert!(matches!(unescape("x%zz"), Err(StaticError::InvalidEscape(e)) if e == "%zz"));
        assert!(matches!(unescape("x%"), Err(StaticError::InvalidEscape(e)) if e == "%"));
        assert!(matches!(unescape("%C3%28"), Err(StaticError::Unescape(_))));
    }

    #[tokio::test]
    async fn test_invalid_escape_is_pending_error() {
        let mut response = get(router(true), "/%C3%28.txt").await;
        let err = PendingError::take(&mut response).unwrap();
        assert!(err.downcast_ref::<StaticError>().is_some());
    }
}
