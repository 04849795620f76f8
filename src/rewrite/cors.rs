//! CORS response header injection.
//!
//! Precedence for allow-headers and allow-methods, independently:
//! configured override > value set by the upstream > built-in default.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::config::ProxyConfig;

pub const DEFAULT_ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";
pub const DEFAULT_ALLOW_METHODS: &str = "GET,POST,PUT,PATCH,DELETE,OPTIONS";

/// Add CORS headers granting `allowed_origin`, with credentials.
pub fn apply_cors(response_headers: &mut HeaderMap, allowed_origin: &str, config: &ProxyConfig) {
    set_header(response_headers, header::ACCESS_CONTROL_ALLOW_ORIGIN, allowed_origin);
    response_headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );

    set_with_default(
        response_headers,
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        &config.cors_allow_headers,
        DEFAULT_ALLOW_HEADERS,
    );
    set_with_default(
        response_headers,
        header::ACCESS_CONTROL_ALLOW_METHODS,
        &config.cors_allow_methods,
        DEFAULT_ALLOW_METHODS,
    );
}

fn set_with_default(headers: &mut HeaderMap, name: HeaderName, configured: &str, default: &'static str) {
    if !configured.is_empty() {
        set_header(headers, name, configured);
    } else if !has_value(headers, &name) {
        headers.insert(name, HeaderValue::from_static(default));
    }
}

fn has_value(headers: &HeaderMap, name: &HeaderName) -> bool {
    headers.get(name).is_some_and(|v| !v.is_empty())
}

fn set_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, value = %value, "Invalid CORS header value skipped"),
    }
}
