//! `Location` redirect rewriting.
//!
//! Absolute redirects always get their host replaced with the public host,
//! whether or not it matches `location_old_host`. Relative or unparsable
//! values fall back to plain substring replacement of the old host.

use axum::http::{header, HeaderMap, HeaderValue};
use url::Url;

use crate::config::ProxyConfig;

/// Rewrite a raw `Location` value. `None` means leave it unchanged.
pub fn rewrite_location(raw: &str, config: &ProxyConfig) -> Option<String> {
    rewrite_location_with(raw, &config.location_old_host, &config.location_new_host)
}

pub(crate) fn rewrite_location_with(raw: &str, old_host: &str, new_host: &str) -> Option<String> {
    if !new_host.is_empty() {
        if let Ok(mut url) = Url::parse(raw) {
            if url.host_str().is_some_and(|h| !h.is_empty()) && retarget(&mut url, new_host) {
                return Some(url.to_string());
            }
        }
    }

    if !old_host.is_empty() && raw.contains(old_host) {
        return Some(raw.replace(old_host, new_host));
    }

    None
}

/// Replace host and port of `url` with `host[:port]`.
fn retarget(url: &mut Url, new_host: &str) -> bool {
    let (host, port) = split_host_port(new_host);
    let port = match port {
        Some(port) => match port.parse::<u16>() {
            Ok(port) => Some(port),
            Err(_) => return false,
        },
        None => None,
    };

    let mut candidate = url.clone();
    if candidate.set_host(Some(host)).is_err() || candidate.set_port(port).is_err() {
        return false;
    }
    *url = candidate;
    true
}

fn split_host_port(authority: &str) -> (&str, Option<&str>) {
    if let Some(rest) = authority.strip_prefix('[') {
        // [v6]:port
        return match rest.split_once(']') {
            Some((host, tail)) => {
                let host = &authority[..host.len() + 2];
                (host, tail.strip_prefix(':').filter(|p| !p.is_empty()))
            }
            None => (authority, None),
        };
    }
    match authority.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => (host, Some(port).filter(|p| !p.is_empty())),
        _ => (authority, None),
    }
}

/// Rewrite the response's `Location` header in place when rewriting is enabled.
pub fn rewrite_location_header(headers: &mut HeaderMap, config: &ProxyConfig) {
    if !config.location_rewrite_enabled() {
        return;
    }

    let Some(raw) = headers.get(header::LOCATION).and_then(|v| v.to_str().ok()) else {
        return;
    };
    let Some(rewritten) = rewrite_location(raw, config) else {
        return;
    };

    match HeaderValue::from_str(&rewritten) {
        Ok(value) => {
            tracing::debug!(from = %raw, to = %rewritten, "Location rewritten");
            headers.insert(header::LOCATION, value);
        }
        Err(_) => tracing::warn!(location = %rewritten, "Rewritten Location is not a valid header value"),
    }
}
