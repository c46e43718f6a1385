//! HTTP server setup.
//!
//! # Responsibilities
//! - Collect route groups and static mounts into one axum Router
//! - Wire up middleware (tracing, request ID, limits, auth, errors, panics)
//! - Answer everything unmatched through the error pipeline
//! - Serve with graceful shutdown
//!
//! # Middleware order (outermost first)
//! ```text
//! trailing-slash rewrite (before routing)
//!     → trace span → request ID → body limit
//!     → auth-context loading
//!     → security headers
//!     → error handling
//!     → request timeout
//!     → panic recovery
//!     → /api only: request info cache → ?fields= trimming
//!     → route / catch-all / static handler
//! ```

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::{any, MethodRouter},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower::util::MapRequest;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::app::App;
use crate::error::{HandlerError, HttpError};
use crate::http::activity::activity_logger;
use crate::http::error_handler::handle_api_errors;
use crate::http::fields::serialize_fields;
use crate::http::request::{remove_trailing_slash, RequestUuid, X_REQUEST_ID};
use crate::http::request_info::eager_request_info;
use crate::http::timeout::request_timeout;
use crate::lifecycle::Shutdown;
use crate::routing::{ApiRouter, RouteGroup};
use crate::security::auth::load_auth_context;
use crate::security::headers::apply_security_headers;
use crate::security::recover::recover_layer;
use crate::static_files::{static_directory_handler, DirFs, StaticFs};

/// The fully wired API, ready to be served or driven with `oneshot`.
pub type ApiService = MapRequest<Router, fn(Request<Body>) -> Request<Body>>;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builder for the API router.
pub struct Api {
    app: Arc<App>,
    routes: ApiRouter,
    statics: Vec<(String, MethodRouter<Arc<App>>)>,
}

impl Api {
    /// Freeze `app` and start an empty API.
    pub fn new(app: App) -> Self {
        Self {
            app: Arc::new(app),
            routes: ApiRouter::new(),
            statics: Vec::new(),
        }
    }

    pub fn app(&self) -> &Arc<App> {
        &self.app
    }

    /// Registry of the routes under `/api`.
    pub fn routes(&mut self) -> &mut ApiRouter {
        &mut self.routes
    }

    pub fn group(&mut self, group: &dyn RouteGroup) -> &mut Self {
        self.routes.group(group);
        self
    }

    /// Serve `fs` under `prefix` (`/` for the site root).
    pub fn static_dir(
        &mut self,
        prefix: &str,
        fs: Arc<dyn StaticFs>,
        index_fallback: bool,
    ) -> &mut Self {
        let prefix = prefix.trim_end_matches('/').to_string();
        self.statics
            .push((prefix, static_directory_handler(fs, index_fallback)));
        self
    }

    /// Build the layered router, without the trailing-slash rewrite.
    pub fn into_router(self) -> Router {
        let app = self.app;
        let config = app.config().clone();

        let catch_all = any(api_not_found).layer(from_fn_with_state(app.clone(), activity_logger));
        let mut router = self
            .routes
            .into_router(catch_all)
            .layer(from_fn(serialize_fields))
            .layer(from_fn_with_state(app.clone(), eager_request_info))
            .fallback(not_found)
            .method_not_allowed_fallback(method_not_allowed);

        for (prefix, handler) in self.statics {
            router = if prefix.is_empty() {
                router
                    .route("/", handler.clone())
                    .route("/{*path}", handler)
            } else {
                router
                    .route(&prefix, handler.clone())
                    .route(&format!("{prefix}/"), handler.clone())
                    .route(&format!("{prefix}/{{*path}}"), handler)
            };
        }

        let router = router
            .layer(recover_layer())
            .layer(from_fn_with_state(app.clone(), request_timeout))
            .layer(from_fn_with_state(app.clone(), handle_api_errors));

        apply_security_headers(router, &config.security)
            .layer(from_fn_with_state(app.clone(), load_auth_context))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, RequestUuid))
            .layer(TraceLayer::new_for_http())
            .with_state(app)
    }

    /// Build the service, trailing-slash rewrite included.
    pub fn build(self) -> ApiService {
        let rewrite: fn(Request<Body>) -> Request<Body> = remove_trailing_slash;
        tower::ServiceExt::map_request(self.into_router(), rewrite)
    }
}

/// Build the API for `app` with the given route groups, serving the
/// configured public directory (if any) at the site root.
pub fn init_api(app: App, groups: &[&dyn RouteGroup]) -> ApiService {
    let mut api = Api::new(app);
    for group in groups {
        api.group(*group);
    }

    let static_files = api.app().config().static_files.clone();
    if let Some(dir) = static_files.public_dir {
        tracing::info!(
            public_dir = %dir,
            index_fallback = static_files.index_fallback,
            "Serving static files"
        );
        api.static_dir("/", Arc::new(DirFs::new(dir)), static_files.index_fallback);
    }

    tracing::debug!(routes = api.routes().len(), "API initialized");
    api.build()
}

async fn api_not_found() -> Result<(), HandlerError> {
    Err(HttpError::not_found().into())
}

async fn not_found() -> HandlerError {
    HttpError::not_found().into()
}

async fn method_not_allowed() -> HandlerError {
    HttpError::method_not_allowed().into()
}

/// HTTP server for the API.
pub struct HttpServer {
    service: ApiService,
    shutdown_grace: Duration,
}

impl HttpServer {
    pub fn new(service: ApiService, shutdown_grace: Duration) -> Self {
        Self {
            service,
            shutdown_grace,
        }
    }

    /// Serve on `listener` until `shutdown` triggers.
    ///
    /// In-flight requests get the grace period to finish; connections still
    /// open after it are dropped.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), ServeError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let mut stop = shutdown.subscribe();
        let mut deadline = shutdown.subscribe();
        let grace = self.shutdown_grace;

        let make_service = axum::ServiceExt::<Request<Body>>::into_make_service(self.service);
        let serve = axum::serve(listener, make_service)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .into_future();

        tokio::select! {
            result = serve => result?,
            _ = async move {
                let _ = deadline.recv().await;
                tokio::time::sleep(grace).await;
            } => {
                tracing::warn!(grace_secs = grace.as_secs(), "Shutdown grace period elapsed, dropping connections");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
