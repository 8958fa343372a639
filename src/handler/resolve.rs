//! Route resolution
//!
//! Pure functions, no I/O: extension extraction, the `Accept` check for the
//! index fallback, and confinement of the joined path to the root.

use std::path::{Path, PathBuf};

use hyper::header::ACCEPT;
use hyper::HeaderMap;

use crate::http::mime;

/// Document served for extensionless routes that accept HTML.
pub const INDEX_FILE: &str = "index.html";

/// Candidate file for a request, relative to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route<'a> {
    pub file: &'a str,
    pub content_type: Option<&'static str>,
}

/// Extension of the final path segment, including the dot.
///
/// Trailing slashes are ignored. A dot at the start of the segment does not
/// begin an extension, so `/.env` and `/..` have none, while `/app.` has `.`.
pub fn extension(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    let name = trimmed.rsplit_once('/').map_or(trimmed, |(_, name)| name);
    if name == ".." {
        return "";
    }
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[idx..],
        _ => "",
    }
}

/// Whether the `Accept` header lists `text/html` as an exact token.
///
/// Repeated `Accept` lines are joined with `", "` first. Tokens are not
/// trimmed, so `application/json, text/html` does not match.
pub fn accepts_html(headers: &HeaderMap) -> bool {
    let values: Vec<&str> = headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if values.is_empty() {
        return false;
    }
    values.join(", ").split(',').any(|token| token == "text/html")
}

/// Pick the file to serve, or `None` when the request is a 404 without any
/// filesystem access.
pub fn resolve<'a>(path: &'a str, headers: &HeaderMap) -> Option<Route<'a>> {
    let ext = extension(path);
    if !ext.is_empty() {
        return Some(Route {
            file: path,
            content_type: mime::get_content_type(ext),
        });
    }

    if accepts_html(headers) {
        Some(Route {
            file: INDEX_FILE,
            content_type: Some(mime::HTML),
        })
    } else {
        None
    }
}

/// Join `candidate` onto `root` segment by segment.
///
/// Empty and `.` segments are dropped; `..` pops a previously pushed segment
/// but never climbs above `root`.
pub fn join_within_root(root: &Path, candidate: &str) -> PathBuf {
    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;

    for segment in candidate.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if depth > 0 {
                    resolved.pop();
                    depth -= 1;
                }
            }
            name => {
                resolved.push(name);
                depth += 1;
            }
        }
    }

    resolved
}
