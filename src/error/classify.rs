//! Error classification.
//!
//! Maps any error produced in the request pipeline into exactly one
//! [`ApiError`]. The rules are applied in priority order over the whole
//! `source()` chain:
//!
//! 1. an [`ApiError`] is used verbatim,
//! 2. a framework error ([`HttpError`] or an axum extractor rejection) keeps
//!    its status and message,
//! 3. anything else becomes 404 when it means "no matching record", 400
//!    otherwise.

use std::error::Error;

use axum::extract::rejection::{
    BytesRejection, FormRejection, JsonRejection, PathRejection, QueryRejection,
    RawPathParamsRejection, StringRejection,
};
use axum::http::StatusCode;

use super::{ApiError, BoxError, HttpError, RawData, RecordNotFound};

/// Classify `err` into an [`ApiError`].
///
/// Never fails. With `debug` set, internals that are not sent to the client
/// are written to the diagnostic log.
pub fn classify(err: BoxError, debug: bool) -> ApiError {
    if let Some(api_err) = find::<ApiError>(&*err) {
        let api_err = api_err.clone();
        if debug {
            if let Some(raw) = api_err.raw_data() {
                tracing::debug!(code = api_err.code(), raw_data = %raw, "api error raw data");
            }
        }
        return api_err;
    }

    if let Some((status, message)) = framework_error(&*err) {
        if debug {
            if let Some(internal) = find::<HttpError>(&*err).and_then(HttpError::internal) {
                tracing::debug!(code = status.as_u16(), internal = %internal, "http error internal cause");
            }
        }
        return ApiError::new(status.as_u16(), message, None).with_shared_raw_data(RawData::from(err));
    }

    if debug {
        tracing::debug!(error = %err, "unclassified api error");
    }

    if is_no_rows(&*err) {
        ApiError::not_found("", Some(err))
    } else {
        ApiError::bad_request("", Some(err))
    }
}

/// Whether `err` (or one of its causes) means "no matching record".
pub fn is_no_rows(err: &(dyn Error + 'static)) -> bool {
    chain(err).any(|e| {
        e.is::<RecordNotFound>()
            || e
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
    })
}

fn chain<'a>(err: &'a (dyn Error + 'static)) -> impl Iterator<Item = &'a (dyn Error + 'static)> {
    std::iter::successors(Some(err), |&e| e.source())
}

fn find<'a, T: Error + 'static>(err: &'a (dyn Error + 'static)) -> Option<&'a T> {
    chain(err).find_map(|e| e.downcast_ref::<T>())
}

macro_rules! rejection_status {
    ($err:expr, $($rejection:ty),+ $(,)?) => {
        $(
            if let Some(rejection) = $err.downcast_ref::<$rejection>() {
                return Some((rejection.status(), rejection.body_text()));
            }
        )+
    };
}

fn framework_error(err: &(dyn Error + 'static)) -> Option<(StatusCode, String)> {
    chain(err).find_map(|e| {
        if let Some(http) = e.downcast_ref::<HttpError>() {
            return Some((http.status(), http.message().to_string()));
        }

        rejection_status!(
            e,
            JsonRejection,
            PathRejection,
            QueryRejection,
            FormRejection,
            RawPathParamsRejection,
            BytesRejection,
            StringRejection,
        );
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use axum::Json;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("loading record: {source}")]
    struct Wrapped {
        source: BoxError,
    }

    fn wrapped(source: impl Into<BoxError>) -> BoxError {
        Box::new(Wrapped { source: source.into() })
    }

    #[test]
    fn test_api_error_is_used_verbatim() {
        let original = ApiError::new(418, "I'm a teapot", Some("brewing".into()));
        let classified = classify(Box::new(original), true);

        assert_eq!(classified.code(), 418);
        assert_eq!(classified.message(), "I'm a teapot.");
        assert_eq!(classified.raw_data().map(|r| r.to_string()).as_deref(), Some("brewing"));
    }

    #[test]
    fn test_api_error_found_in_source_chain() {
        let classified = classify(wrapped(ApiError::forbidden("", None)), false);
        assert_eq!(classified.code(), 403);
    }

    #[test]
    fn test_http_error_is_wrapped() {
        let err = HttpError::new(StatusCode::CONFLICT)
            .with_message("duplicate key")
            .with_internal("unique constraint violated");
        let classified = classify(Box::new(err), true);

        assert_eq!(classified.code(), 409);
        assert_eq!(classified.message(), "Duplicate key.");
        assert!(classified.raw_data().is_some());
    }

    #[test]
    fn test_no_rows_maps_to_not_found() {
        assert_eq!(classify(Box::new(RecordNotFound), false).code(), 404);
        assert_eq!(classify(wrapped(RecordNotFound), false).code(), 404);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(classify(Box::new(io), false).code(), 404);
    }

    #[test]
    fn test_unknown_error_maps_to_bad_request() {
        let classified = classify("something odd".into(), true);
        assert_eq!(classified.code(), 400);
        assert_eq!(
            classified.message(),
            "Something went wrong while processing your request."
        );
        assert_eq!(
            classified.raw_data().map(|r| r.to_string()).as_deref(),
            Some("something odd")
        );
    }

    #[test]
    fn test_every_class_yields_valid_status() {
        let inputs: Vec<BoxError> = vec![
            Box::new(ApiError::new(0, "bogus", None)),
            Box::new(HttpError::new(StatusCode::SERVICE_UNAVAILABLE)),
            Box::new(RecordNotFound),
            "plain".into(),
            Box::new(std::fmt::Error),
        ];

        for input in inputs {
            let code = classify(input, false).code();
            assert!((100..=599).contains(&code), "invalid code {code}");
        }
    }

    #[tokio::test]
    async fn test_axum_rejection_keeps_its_status() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/records")
            .body(Body::from("{}"))
            .unwrap();

        // No content-type header.
        let rejection = Json::<serde_json::Value>::from_request(request, &())
            .await
            .unwrap_err();
        let classified = classify(Box::new(rejection), false);

        assert_eq!(classified.code(), 415);
    }
}
