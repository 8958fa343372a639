//! Error types
//!
//! `ServeError` covers the per-request failures the handler cannot recover
//! from; `StartupError` covers everything that can stop the process before
//! the accept loop runs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failure while serving a single request.
///
/// Missing files are not errors: they resolve to a 404 outcome. Everything
/// here ends up as a 500 at the transport layer.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to stat {}: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("gzip compression failed: {0}")]
    Compress(#[source] io::Error),
}

/// Failure during process startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid listen address {addr}: {source}")]
    Address {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to initialise logger: {0}")]
    Logger(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_error_names_path() {
        let err = ServeError::Stat {
            path: PathBuf::from("/srv/www/app.js"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        let msg = err.to_string();
        assert!(msg.contains("/srv/www/app.js"), "got: {msg}");
        assert!(msg.starts_with("failed to stat"));
    }
}
