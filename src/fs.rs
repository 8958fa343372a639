//! Filesystem access
//!
//! The request handler only ever needs two operations, a stat and a whole-file
//! read. They sit behind `FileSystem` so the handler can be driven by an
//! in-memory fake in tests.

use std::future::Future;
use std::io;
use std::path::Path;

/// Result of a single stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    pub is_file: bool,
    pub len: u64,
}

/// Filesystem collaborator used by the request handler.
///
/// `stat` must report a missing path with `io::ErrorKind::NotFound`; any
/// other error kind is treated as fatal for the request.
pub trait FileSystem: Send + Sync + 'static {
    fn stat(&self, path: &Path) -> impl Future<Output = io::Result<FileMeta>> + Send;

    fn read(&self, path: &Path) -> impl Future<Output = io::Result<Vec<u8>>> + Send;
}

/// Tokio-backed filesystem. Symlinks are followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl FileSystem for TokioFs {
    async fn stat(&self, path: &Path) -> io::Result<FileMeta> {
        let meta = tokio::fs::metadata(path).await?;
        Ok(FileMeta {
            is_file: meta.is_file(),
            len: meta.len(),
        })
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}
