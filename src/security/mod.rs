//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → auth.rs (resolve token into an AuthContext, attach to request)
//!     → headers.rs (baseline security response headers)
//!     → recover.rs (handler panics become pipeline errors)
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - Authentication is resolved here, authorization belongs to route groups
//! - Responses never carry panic details beyond the error envelope

pub mod auth;
pub mod headers;
pub mod recover;

pub use auth::{AuthContext, AuthLoader, NoAuth};
pub use headers::apply_security_headers;
pub use recover::{recover_layer, RecoverPanic};
