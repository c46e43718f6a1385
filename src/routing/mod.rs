//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route groups (at startup)
//!     → RouteGroup::bind(&mut ApiRouter)
//!     → ApiRouter registry keyed by (method, path), last registration wins
//!     → into_router: catch-all registered last, one axum route per path
//!     → frozen axum Router under /api
//! ```
//!
//! # Design Decisions
//! - Routes collected at startup, immutable at runtime
//! - Re-registering a route replaces it instead of panicking
//! - Registration order never influences matching

pub mod router;

pub use router::{ApiRouter, RouteGroup, API_MOUNT};
