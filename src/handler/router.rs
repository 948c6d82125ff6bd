//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: path decoding, endpoint
//! classification, dispatch and access logging.

use crate::config::AppState;
use crate::handler::error::ServeError;
use crate::handler::{images, static_files};
use crate::http::path::percent_decode;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
///
/// The method is not inspected: every request is treated as a read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let raw_path = req.uri().path();
    let decoded = percent_decode(raw_path);

    let response = match decoded.as_deref() {
        Some(path) => route_request(path, &state).await,
        None => ServeError::BadPath {
            raw: raw_path.to_string(),
        }
        .into_response(),
    };

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            remote_addr.ip().to_string(),
            req.method().to_string(),
            decoded.unwrap_or_else(|| raw_path.to_string()),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.referer = header_value(&req, "referer");
        entry.user_agent = header_value(&req, "user-agent");
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route a decoded path to the image listing or the static file resolver
pub async fn route_request(path: &str, state: &AppState) -> Response<Full<Bytes>> {
    if path == state.config.content.images_route {
        return images::serve_image_list(state).await;
    }
    static_files::serve_path(state, path).await
}

fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
