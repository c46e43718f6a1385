//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (trailing-slash rewrite, request ID)
//!     → request_info.rs (/api: body buffered once, cached RequestInfo)
//!     → route group / catch-all / static handler
//!     → fields.rs (/api: ?fields= trimming of JSON responses)
//!     → error_handler.rs (failed responses: classify, hooks, write)
//!     → timeout.rs (per-request time limit, parks a 408)
//!     → activity.rs (per-route activity log)
//!     → Send to client
//! ```

pub mod activity;
pub mod context;
pub mod error_handler;
pub mod fields;
pub mod request;
pub mod request_info;
pub mod server;
pub mod timeout;

pub use context::{RequestContext, ResponseError};
pub use error_handler::{handle_api_errors, ErrorHandler};
pub use fields::{pick_fields, serialize_fields, FIELDS_PARAM};
pub use request::{remove_trailing_slash, RequestUuid, X_REQUEST_ID};
pub use request_info::{eager_request_info, RequestInfo};
pub use server::{init_api, Api, ApiService, HttpServer, ServeError};
pub use timeout::request_timeout;
