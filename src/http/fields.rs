//! `?fields=` response trimming for JSON API responses.
//!
//! The parameter is a comma separated list of keys. A dotted key selects
//! inside a nested object, `*` keeps every key at its level, and arrays are
//! trimmed element-wise:
//!
//! ```text
//! ?fields=id,owner.name      {"id":1,"title":"x","owner":{"id":2,"name":"n"}}
//!                          → {"id":1,"owner":{"name":"n"}}
//! ```
//!
//! Only successful `application/json` responses are rewritten; error
//! envelopes keep their fixed `{code, message, data}` shape.

use axum::{
    body::Body,
    extract::Query,
    http::{header, Request, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::HandlerError;

/// Query parameter holding the field list.
pub const FIELDS_PARAM: &str = "fields";

#[derive(Debug, Default, Deserialize)]
struct FieldsQuery {
    fields: Option<String>,
}

/// The non-empty `fields` value of `uri`, if any.
pub fn fields_param(uri: &Uri) -> Option<String> {
    Query::<FieldsQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.fields)
        .filter(|fields| !fields.trim().is_empty())
}

pub async fn serialize_fields(request: Request<Body>, next: Next) -> Response {
    let fields = fields_param(request.uri());
    let response = next.run(request).await;

    match fields {
        Some(fields) if response.status().is_success() && is_json(&response) => {
            pick_response(response, &fields).await
        }
        _ => response,
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

async fn pick_response(response: Response, fields: &str) -> Response {
    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => return HandlerError::from(e).into_response(),
    };

    let mut value: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(e) => {
            tracing::trace!(error = %e, "Response is not valid JSON, fields ignored");
            return Response::from_parts(parts, Body::from(bytes));
        }
    };
    pick_fields(&mut value, fields);

    match serde_json::to_vec(&value) {
        Ok(body) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(body))
        }
        Err(e) => HandlerError::from(e).into_response(),
    }
}

/// Trim `data` in place down to the comma separated `fields`.
pub fn pick_fields(data: &mut Value, fields: &str) {
    let fields: Vec<String> = fields
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(String::from)
        .collect();
    pick(data, &fields);
}

fn pick(data: &mut Value, fields: &[String]) {
    match data {
        Value::Object(map) => pick_map(map, fields),
        Value::Array(items) => items.iter_mut().for_each(|item| pick(item, fields)),
        _ => {}
    }
}

fn pick_map(map: &mut Map<String, Value>, fields: &[String]) {
    if fields.is_empty() {
        return;
    }

    let mut fields = fields.to_vec();
    if fields.iter().any(|f| f == "*") {
        for key in map.keys() {
            if !fields.iter().any(|f| below(f, key).is_some()) {
                fields.push(key.clone());
            }
        }
    }

    map.retain(|key, value| {
        let mut nested = Vec::new();
        for field in &fields {
            match below(field, key) {
                Some("") => return true,
                Some(rest) => nested.push(rest.to_string()),
                None => {}
            }
        }
        if nested.is_empty() {
            return false;
        }
        pick(value, &nested);
        true
    });
}

/// The rest of `field` under `key`; `Some("")` when it names `key` itself.
fn below<'a>(field: &'a str, key: &str) -> Option<&'a str> {
    let rest = field.strip_prefix(key)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix('.')
    }
}
