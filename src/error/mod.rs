//! Error normalization subsystem.
//!
//! # Data Flow
//! ```text
//! handler returns Err(HandlerError)
//!     → handler.rs (error parked in response extensions)
//!     → classify.rs (ApiError / HttpError / rejection / no-rows / other)
//!     → ApiError (code + message for the client, raw data for logs)
//! ```

pub mod api;
pub mod classify;
pub mod handler;
pub mod http;

pub use api::{ApiError, RawData};
pub use classify::{classify, is_no_rows};
pub use handler::{HandlerError, PanicError, PendingError, RecordNotFound};
pub use http::HttpError;

/// Type-erased error used across the request pipeline.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
