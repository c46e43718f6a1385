//! Extension points.
//!
//! Collaborators observe or alter the error path by registering handlers
//! on the application's before/after error hooks instead of modifying the
//! HTTP layer.

pub mod event;
pub mod hook;

pub use event::ApiErrorEvent;
pub use hook::{HandlerId, Hook, HookError, HookResult};
