//! Request dispatch module
//!
//! Adapts [`StaticFiles`](super::StaticFiles) to hyper: maps the outcome to a
//! response, turns fatal errors into a 500, and writes the access log.

use crate::config::AppState;
use crate::handler::Outcome;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{REFERER, USER_AGENT};
use hyper::{HeaderMap, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// The method is not inspected. The request body is never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let path = req.uri().path();

    let response = match state.files.serve(path, req.headers()).await {
        Ok(Outcome::Found(file)) => {
            tracing::debug!(
                path,
                original = file.original_len,
                compressed = file.body.len(),
                "serving gzip response"
            );
            http::build_gzip_response(file.body, file.content_type)
        }
        Ok(Outcome::NotFound) => http::build_404_response(),
        Err(e) => {
            logger::log_error(&format!("{} {path}: {e}", req.method()));
            http::build_500_response()
        }
    };

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(peer_addr, req.method(), req.uri(), req.version());
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.referer = header_string(req.headers(), REFERER);
        entry.user_agent = header_string(req.headers(), USER_AGENT);
        entry.elapsed = started.elapsed();
        logger::log_access(&entry, &state.access_log_format);
    }

    Ok(response)
}

fn header_string(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
