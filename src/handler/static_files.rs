//! Static file serving module
//!
//! Resolves a request to a file under the root, reads it, and gzip-compresses
//! the whole buffer. Every request reads and compresses from scratch.

use std::io;
use std::path::PathBuf;

use hyper::body::Bytes;
use hyper::HeaderMap;
use tracing::debug;

use crate::error::ServeError;
use crate::fs::{FileSystem, TokioFs};
use crate::handler::resolve;
use crate::http;

/// A file ready to be sent: gzip body plus the content type, if known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedFile {
    pub body: Bytes,
    pub content_type: Option<&'static str>,
    /// Size of the file before compression
    pub original_len: usize,
}

/// Result of handling one request. Fatal failures are the `Err` side of
/// [`StaticFiles::serve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found(ServedFile),
    NotFound,
}

/// Request handler bound to a root directory.
#[derive(Debug, Clone)]
pub struct StaticFiles<F = TokioFs> {
    root: PathBuf,
    fs: F,
}

impl StaticFiles<TokioFs> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_fs(root, TokioFs)
    }
}

impl<F: FileSystem> StaticFiles<F> {
    pub fn with_fs(root: impl Into<PathBuf>, fs: F) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }

    /// Handle a request path with its headers
    ///
    /// Extensionless requests that do not accept `text/html` return
    /// `NotFound` before any filesystem access. A missing path or a path that
    /// is not a regular file is `NotFound`; any other I/O failure is an error.
    pub async fn serve(&self, path: &str, headers: &HeaderMap) -> Result<Outcome, ServeError> {
        let Some(route) = resolve::resolve(path, headers) else {
            debug!(path, "extensionless request without text/html accept");
            return Ok(Outcome::NotFound);
        };

        let file_path = resolve::join_within_root(&self.root, route.file);

        let meta = match self.fs.stat(&file_path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(file = %file_path.display(), "file not found");
                return Ok(Outcome::NotFound);
            }
            Err(source) => {
                return Err(ServeError::Stat {
                    path: file_path,
                    source,
                })
            }
        };

        if !meta.is_file {
            debug!(file = %file_path.display(), "not a regular file");
            return Ok(Outcome::NotFound);
        }

        debug!(file = %file_path.display(), size = meta.len, "reading file");

        let content = match self.fs.read(&file_path).await {
            Ok(content) => content,
            Err(source) => {
                return Err(ServeError::Read {
                    path: file_path,
                    source,
                })
            }
        };

        let compressed = http::gzip(&content).map_err(ServeError::Compress)?;

        Ok(Outcome::Found(ServedFile {
            body: Bytes::from(compressed),
            content_type: route.content_type,
            original_len: content.len(),
        }))
    }
}
