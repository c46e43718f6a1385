//! Route registry for the `/api` mount.
//!
//! # Responsibilities
//! - Collect routes registered by route groups
//! - Resolve duplicate registrations (the later one wins)
//! - Produce the axum router, catch-all registered last
//!
//! # Design Decisions
//! - axum refuses overlapping registrations, so duplicates are resolved here
//! - An any-method registration replaces every route of its pattern
//! - A method registration after an any-method one overrides that method only

use std::fmt;
use std::sync::Arc;

use axum::{
    handler::Handler,
    http::Method,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};

use crate::app::App;

/// Path every API route is mounted under.
pub const API_MOUNT: &str = "/api";

/// Patterns answered by the catch-all terminator, relative to the mount.
const CATCH_ALL_PATTERNS: [&str; 2] = ["", "/{*path}"];

/// External collaborator registering endpoints under the API mount.
pub trait RouteGroup: Send + Sync {
    /// Name used in startup logs.
    fn name(&self) -> &str;

    fn bind(&self, api: &mut ApiRouter);
}

struct RouteEntry {
    path: String,
    /// `None` for any-method routes.
    method: Option<Method>,
    route: MethodRouter<Arc<App>>,
}

#[derive(Default)]
pub struct ApiRouter {
    entries: Vec<RouteEntry>,
}

impl ApiRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `route` for `method` at `path`, relative to [`API_MOUNT`].
    ///
    /// `route` is usually built with `axum::routing::{get, post, ...}` and may
    /// carry its own `route_layer`s (group middleware).
    pub fn route(
        &mut self,
        method: Option<Method>,
        path: &str,
        route: MethodRouter<Arc<App>>,
    ) -> &mut Self {
        let path = mounted(path);

        match &method {
            Some(m) => self
                .entries
                .retain(|e| !(e.path == path && e.method.as_ref() == Some(m))),
            None => self.entries.retain(|e| e.path != path),
        }

        tracing::trace!(path = %path, method = ?method, "Route registered");
        self.entries.push(RouteEntry {
            path,
            method,
            route,
        });
        self
    }

    /// Register `handler` for `method` at `path`.
    ///
    /// Methods axum has no filter for (custom verbs) are ignored with a
    /// warning.
    pub fn on<H, T>(&mut self, method: Method, path: &str, handler: H) -> &mut Self
    where
        H: Handler<T, Arc<App>>,
        T: 'static,
    {
        match MethodFilter::try_from(method.clone()) {
            Ok(filter) => self.route(Some(method), path, on(filter, handler)),
            Err(e) => {
                tracing::warn!(method = %method, path, error = %e, "Unsupported route method");
                self
            }
        }
    }

    pub fn get<H, T>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: Handler<T, Arc<App>>,
        T: 'static,
    {
        self.on(Method::GET, path, handler)
    }

    pub fn post<H, T>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: Handler<T, Arc<App>>,
        T: 'static,
    {
        self.on(Method::POST, path, handler)
    }

    pub fn patch<H, T>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: Handler<T, Arc<App>>,
        T: 'static,
    {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete<H, T>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: Handler<T, Arc<App>>,
        T: 'static,
    {
        self.on(Method::DELETE, path, handler)
    }

    /// Register `handler` for every method at `path`.
    pub fn any<H, T>(&mut self, path: &str, handler: H) -> &mut Self
    where
        H: Handler<T, Arc<App>>,
        T: 'static,
    {
        self.route(None, path, MethodRouter::new().fallback(handler))
    }

    /// Add every route of `group`.
    pub fn group(&mut self, group: &dyn RouteGroup) -> &mut Self {
        let before = self.entries.len();
        group.bind(self);
        tracing::debug!(
            group = group.name(),
            routes = self.entries.len().saturating_sub(before),
            "Route group bound"
        );
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a route is registered for `method` (`None`: any method) at
    /// `path`, relative to the mount.
    pub fn contains(&self, method: Option<&Method>, path: &str) -> bool {
        let path = mounted(path);
        self.entries
            .iter()
            .any(|e| e.path == path && e.method.as_ref() == method)
    }

    /// Build the axum router.
    ///
    /// `catch_all` is registered last for `/api` and `/api/{*path}`, so it
    /// replaces whatever a route group registered on those two patterns.
    pub fn into_router(mut self, catch_all: MethodRouter<Arc<App>>) -> Router<Arc<App>> {
        for pattern in CATCH_ALL_PATTERNS {
            self.route(None, pattern, catch_all.clone());
        }

        let mut paths: Vec<(String, Vec<MethodRouter<Arc<App>>>)> = Vec::new();
        for entry in self.entries {
            match paths.iter_mut().find(|(path, _)| *path == entry.path) {
                Some((_, routes)) => routes.push(entry.route),
                None => paths.push((entry.path, vec![entry.route])),
            }
        }

        let mut router = Router::new();
        for (path, routes) in paths {
            if let Some(route) = routes.into_iter().reduce(MethodRouter::merge) {
                router = router.route(&path, route);
            }
        }
        router
    }
}

impl fmt::Debug for ApiRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (&e.method, &e.path)))
            .finish()
    }
}

fn mounted(path: &str) -> String {
    let path = path.trim_end_matches('/');
    if path.is_empty() {
        API_MOUNT.to_string()
    } else if path.starts_with('/') {
        format!("{API_MOUNT}{path}")
    } else {
        format!("{API_MOUNT}/{path}")
    }
}
