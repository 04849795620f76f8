//! CORS origin policy.
//!
//! Decides which origin, if any, the response grants cross-origin access to.
//! First match wins:
//! 1. the configured `cors_origin` override
//! 2. the request's `Origin` header, trimmed
//! 3. `scheme://host` of an absolute `Referer`
//! 4. nothing
//!
//! Step 2 echoes any caller-supplied origin back with credentials allowed.
//! Deployments that need an allow-list must pin `cors_origin`.

use axum::http::{header, HeaderMap};
use url::Url;

use crate::config::ProxyConfig;

/// Resolve the allowed origin for a response. `None` means no CORS headers.
pub fn resolve_allowed_origin(config: &ProxyConfig, request_headers: &HeaderMap) -> Option<String> {
    allowed_origin(&config.cors_origin, request_headers)
}

pub(crate) fn allowed_origin(cors_origin: &str, request_headers: &HeaderMap) -> Option<String> {
    if !cors_origin.is_empty() {
        return Some(cors_origin.to_string());
    }

    if let Some(origin) = header_str(request_headers, header::ORIGIN) {
        return Some(origin.to_string());
    }

    header_str(request_headers, header::REFERER).and_then(origin_of_referer)
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn origin_of_referer(referer: &str) -> Option<String> {
    let url = Url::parse(referer).ok()?;
    let host = url.host_str().filter(|h| !h.is_empty())?;
    match url.port() {
        Some(port) => Some(format!("{}://{}:{}", url.scheme(), host, port)),
        None => Some(format!("{}://{}", url.scheme(), host)),
    }
}
