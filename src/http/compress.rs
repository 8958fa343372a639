//! gzip encoding
//!
//! Whole-buffer compression only. The compressed length is needed for
//! `Content-Length` before any header is written.

use std::io::{self, Write};

use flate2::write::GzEncoder;
use flate2::Compression;

/// Compress `data` into a complete gzip member at the default level.
pub fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2 + 32), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
