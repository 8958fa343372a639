//! Request handler module
//!
//! `resolve` turns a request path and headers into a candidate file,
//! `static_files` is the request handler proper, and `router` adapts it to
//! hyper.

pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
pub use static_files::{Outcome, ServedFile, StaticFiles};
