//! Outbound request preparation.

use axum::http::{header, uri::PathAndQuery, HeaderValue, Request, Uri};

use crate::config::ProxyConfig;

/// Strip the configured path prefix and point `Host` at the upstream.
pub fn prepare_outbound<B>(request: &mut Request<B>, config: &ProxyConfig) {
    if let Some(stripped) = strip_prefix(request.uri(), &config.strip_prefix) {
        tracing::debug!(from = %request.uri(), to = %stripped, "Stripped path prefix");
        *request.uri_mut() = stripped;
    }

    match HeaderValue::from_str(&config.upstream.authority) {
        Ok(host) => {
            request.headers_mut().insert(header::HOST, host);
        }
        Err(_) => tracing::warn!(host = %config.upstream.authority, "Upstream host is not a valid header value"),
    }
}

/// The URI with `prefix` removed from its path, or `None` if nothing changes.
fn strip_prefix(uri: &Uri, prefix: &str) -> Option<Uri> {
    if prefix.is_empty() {
        return None;
    }
    let rest = uri.path().strip_prefix(prefix)?;

    let path = if rest.starts_with('/') {
        rest.to_string()
    } else {
        format!("/{}", rest)
    };
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path,
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}
