//! Baseline security response headers.
//!
//! # Responsibilities
//! - Add `X-XSS-Protection`, `X-Content-Type-Options`, `X-Frame-Options`
//! - Optionally add `Content-Security-Policy` and `Referrer-Policy`
//!
//! # Design Decisions
//! - Headers already set by a handler are never overwritten
//! - Applied to every response, error envelopes included

use axum::{
    http::{header, HeaderValue},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::SecurityConfig;

/// Wrap `router` with the security headers enabled in `config`.
pub fn apply_security_headers<S>(router: Router<S>, config: &SecurityConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if !config.enable_headers {
        return router;
    }

    let mut router = router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ));

    if let Some(value) = optional_value(config.content_security_policy.as_deref()) {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_SECURITY_POLICY,
            value,
        ));
    }

    if let Some(value) = optional_value(config.referrer_policy.as_deref()) {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            value,
        ));
    }

    router
}

fn optional_value(value: Option<&str>) -> Option<HeaderValue> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => match HeaderValue::from_str(v) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(value = v, error = %e, "Ignoring invalid security header value");
                None
            }
        },
        _ => None,
    }
}
