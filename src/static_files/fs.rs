//! Virtual filesystems for static assets.
//!
//! [`StaticFs`] is the seam between the static handler and wherever the
//! assets live: a directory on disk ([`DirFs`]) or a set of in-memory files
//! ([`MemoryFs`], e.g. an embedded admin UI).

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use axum::body::{Body, Bytes};
use futures_util::future::BoxFuture;
use tokio_util::io::ReaderStream;

/// Entry document of a directory and of the index fallback.
pub const INDEX_FILE: &str = "index.html";

/// An opened file ready to be streamed.
pub struct StaticFile {
    /// Name of the file actually opened (`dir/index.html` for directories).
    pub name: String,
    pub body: Body,
    pub len: Option<u64>,
    pub modified: Option<SystemTime>,
}

impl StaticFile {
    /// Content type inferred from the file extension.
    pub fn content_type(&self) -> &'static str {
        mime_from_extension(Path::new(&self.name))
    }
}

/// Read-only filesystem rooted at some directory.
///
/// `name` is always a cleaned, `/`-separated relative name (`"."` is the
/// root). A directory resolves to its `index.html`. A missing file is
/// reported as [`io::ErrorKind::NotFound`].
pub trait StaticFs: Send + Sync + 'static {
    fn open<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<StaticFile>>;
}

/// Files served from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StaticFs for DirFs {
    fn open<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<StaticFile>> {
        Box::pin(async move {
            let mut name = name.to_string();
            let mut path = self.root.join(&name);
            let mut meta = tokio::fs::metadata(&path).await?;

            if meta.is_dir() {
                name = index_name(&name);
                path = self.root.join(&name);
                meta = tokio::fs::metadata(&path).await?;
                if meta.is_dir() {
                    return Err(io::ErrorKind::NotFound.into());
                }
            }

            let file = tokio::fs::File::open(&path).await?;
            Ok(StaticFile {
                name,
                body: Body::from_stream(ReaderStream::new(file)),
                len: Some(meta.len()),
                modified: meta.modified().ok(),
            })
        })
    }
}

/// Files held in memory, keyed by their relative name.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: HashMap<String, Bytes>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; `name` is relative to the root, e.g. `assets/app.js`.
    pub fn with_file(mut self, name: &str, content: impl Into<Bytes>) -> Self {
        self.files
            .insert(name.trim_start_matches('/').to_string(), content.into());
        self
    }

    fn lookup(&self, name: &str) -> Option<(String, Bytes)> {
        if let Some(content) = self.files.get(name) {
            return Some((name.to_string(), content.clone()));
        }
        let index = index_name(name);
        self.files.get(&index).map(|content| (index, content.clone()))
    }
}

impl StaticFs for MemoryFs {
    fn open<'a>(&'a self, name: &'a str) -> BoxFuture<'a, io::Result<StaticFile>> {
        Box::pin(async move {
            let (name, content) = self
                .lookup(name)
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;

            Ok(StaticFile {
                name,
                len: Some(content.len() as u64),
                body: Body::from(content),
                modified: None,
            })
        })
    }
}

fn index_name(dir: &str) -> String {
    if dir == "." {
        INDEX_FILE.to_string()
    } else {
        format!("{dir}/{INDEX_FILE}")
    }
}

/// Map a file extension to a MIME content-type string.
fn mime_from_extension(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("json") | Some("map") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("wasm") => "application/wasm",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",
        _ => "application/octet-stream",
    }
}
