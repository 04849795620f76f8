//! Single-upstream forwarding engine.
//!
//! # Responsibilities
//! - Copy the inbound request into an outbound one, minus hop-by-hop headers
//! - Record the client in `X-Forwarded-For`
//! - Run the pre-dispatch hook, then target the upstream origin
//! - Dispatch, run the post-receipt hook, stream the body back
//!
//! # Design Decisions
//! - The rewriting logic only sees the two hook points, never the transport
//! - Bodies are streamed in both directions, never buffered
//! - No retries: a failed dispatch is answered with 502 immediately
//! - The request timeout bounds dispatch up to response headers and is
//!   answered with the same 502

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Response, Uri};

use crate::config::Upstream;
use crate::error::ProxyError;
use crate::http::client::UpstreamClient;

/// Mutation points the forwarding engine exposes around a dispatch.
pub trait ForwardHooks: Send + Sync {
    /// Runs on the outbound copy of the request, whose URI is still the
    /// client's origin-form path and query.
    fn before_dispatch(&self, request: &mut Request<Body>);

    /// Runs on the upstream response before its headers reach the client.
    /// `request_headers` are the headers that were sent upstream.
    /// An error aborts relaying with `502 Bad Gateway`.
    fn after_receipt(&self, request_headers: &HeaderMap, response: &mut Response<Body>) -> Result<(), ProxyError>;
}

/// Headers that apply to a single connection and are never forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("proxy-connection"),
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// Forwards every request to one upstream origin.
pub struct Forwarder {
    client: UpstreamClient,
    upstream: Upstream,
    hooks: Arc<dyn ForwardHooks>,
    request_timeout: Duration,
}

impl Forwarder {
    pub fn new(
        client: UpstreamClient,
        upstream: Upstream,
        hooks: Arc<dyn ForwardHooks>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            upstream,
            hooks,
            request_timeout,
        }
    }

    /// Relay one request. Never fails: dispatch errors become a 502.
    pub async fn forward(&self, request: Request<Body>, client_addr: Option<SocketAddr>) -> Response<Body> {
        match self.try_forward(request, client_addr).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(upstream = %self.upstream.url, error = %e, "proxy error");
                axum::response::IntoResponse::into_response(e)
            }
        }
    }

    async fn try_forward(&self, request: Request<Body>, client_addr: Option<SocketAddr>) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = request.into_parts();

        let mut outbound = Request::builder()
            .method(parts.method)
            .uri(parts.uri)
            .body(body)?;
        *outbound.headers_mut() = parts.headers;
        remove_hop_by_hop(outbound.headers_mut());
        if let Some(addr) = client_addr {
            append_forwarded_for(outbound.headers_mut(), addr);
        }

        self.hooks.before_dispatch(&mut outbound);

        *outbound.uri_mut() = target_uri(&self.upstream, outbound.uri())?;
        let sent_headers = outbound.headers().clone();

        tracing::debug!(method = %outbound.method(), uri = %outbound.uri(), "Dispatching upstream");
        let response = tokio::time::timeout(self.request_timeout, self.client.request(outbound))
            .await
            .map_err(|_| ProxyError::Timeout(self.request_timeout))??;

        let (mut parts, body) = response.into_parts();
        remove_hop_by_hop(&mut parts.headers);
        let mut response = Response::from_parts(parts, Body::new(body));

        self.hooks.after_receipt(&sent_headers, &mut response)?;
        Ok(response)
    }
}

fn remove_hop_by_hop(headers: &mut HeaderMap) {
    // Headers named in Connection are hop-by-hop as well.
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    // Upgrade is only meaningful together with Connection, which is gone.
    headers.remove(header::UPGRADE);
}

fn append_forwarded_for(headers: &mut HeaderMap, addr: SocketAddr) {
    let client_ip = addr.ip().to_string();
    let prior: Vec<&str> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        client_ip
    } else {
        format!("{}, {}", prior.join(", "), client_ip)
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert("x-forwarded-for", value);
    }
}

/// Absolute URI on the upstream for an origin-form request URI.
fn target_uri(upstream: &Upstream, uri: &Uri) -> Result<Uri, ProxyError> {
    let base = &upstream.url;
    let path = join_paths(base.path(), uri.path());
    let query = match (base.query().filter(|q| !q.is_empty()), uri.query().filter(|q| !q.is_empty())) {
        (Some(a), Some(b)) => Some(format!("{}&{}", a, b)),
        (Some(q), None) | (None, Some(q)) => Some(q.to_string()),
        (None, None) => None,
    };
    let path_and_query = match query {
        Some(query) => format!("{}?{}", path, query),
        None => path,
    };

    let scheme = if upstream.is_https() { Scheme::HTTPS } else { Scheme::HTTP };
    Uri::builder()
        .scheme(scheme)
        .authority(Authority::try_from(upstream.authority.as_str()).map_err(axum::http::Error::from)?)
        .path_and_query(PathAndQuery::try_from(path_and_query).map_err(axum::http::Error::from)?)
        .build()
        .map_err(ProxyError::from)
}

/// Join two paths with exactly one slash between them.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}
