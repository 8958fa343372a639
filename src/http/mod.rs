//! HTTP protocol layer module
//!
//! Content-type lookup, gzip encoding and response builders. Nothing in here
//! touches the filesystem.

pub mod compress;
pub mod mime;
pub mod response;

pub use compress::gzip;
pub use response::{build_404_response, build_500_response, build_gzip_response};
