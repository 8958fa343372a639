//! MIME type detection module
//!
//! The table is fixed: four web extensions. Anything else gets no
//! `Content-Type` header at all.

/// Content type used for HTML files and for the index fallback.
pub const HTML: &str = "text/html; charset=utf-8";

/// Get MIME Content-Type for an extension (including the leading dot)
///
/// # Examples
/// ```
/// use gzserve::http::mime::get_content_type;
/// assert_eq!(get_content_type(".html"), Some("text/html; charset=utf-8"));
/// assert_eq!(get_content_type(".wasm"), Some("application/wasm"));
/// assert_eq!(get_content_type(".png"), None);
/// ```
pub fn get_content_type(extension: &str) -> Option<&'static str> {
    match extension {
        ".html" => Some(HTML),
        ".js" => Some("application/javascript; charset=utf-8"),
        ".css" => Some("text/css; charset=utf-8"),
        ".wasm" => Some("application/wasm"),
        _ => None,
    }
}
