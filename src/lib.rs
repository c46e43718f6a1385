//! HTTP API bootstrap and error normalization.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ trailing-slash rewrite (/api/* only)
//!                         │
//!                         ▼
//!                  request ID / trace / timeout / body limit
//!                         │
//!                         ▼
//!                  auth context ─▶ security headers ─▶ error handling ─▶ panic recovery
//!                                                                            │
//!                         ┌──────────────────────────────────────────────────┤
//!                         ▼                                                  ▼
//!                  route groups under /api                        static files / catch-all
//!                         │
//!                         ▼ (on failure)
//!                  classify ─▶ before hooks ─▶ JSON envelope ─▶ after hooks
//! ```
//!
//! Route groups, the auth resolver and the settings store are external
//! collaborators: they plug in through [`routing::RouteGroup`],
//! [`security::AuthLoader`] and the hooks on [`App`].

pub mod app;
pub mod config;
pub mod error;
pub mod hooks;
pub mod http;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod routing;
pub mod security;
pub mod static_files;

pub use app::App;
pub use config::AppConfig;
pub use error::{ApiError, HandlerError, HttpError};
pub use http::{init_api, Api, ApiService, HttpServer};
pub use lifecycle::Shutdown;
pub use routing::{ApiRouter, RouteGroup};
