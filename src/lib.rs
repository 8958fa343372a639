//! gzserve - a minimal static file server.
//!
//! Serves files from a root directory, infers `Content-Type` for a handful of
//! web extensions, falls back to `index.html` for extensionless routes that
//! accept HTML, and gzip-compresses every successful response.

pub mod config;
pub mod error;
pub mod fs;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
