//! Static asset serving.
//!
//! `path` normalizes request paths, `fs` abstracts where files live and
//! `handler` ties both into an axum route.

pub mod fs;
pub mod handler;
pub mod path;

pub use fs::{DirFs, MemoryFs, StaticFile, StaticFs, INDEX_FILE};
pub use handler::{static_directory_handler, StaticError};
pub use path::clean_name;
