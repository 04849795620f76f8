//! Response header transformation.

use axum::http::HeaderMap;

use crate::config::ProxyConfig;
use crate::rewrite::{cookie, cors, location, policy};

/// Apply every response rewrite, in order: cookies, CORS, `Location`.
///
/// `request_headers` are the headers of the request that produced the
/// response; they feed the origin policy.
pub fn transform_response(request_headers: &HeaderMap, response_headers: &mut HeaderMap, config: &ProxyConfig) {
    cookie::rewrite_set_cookies(response_headers, &config.cookie_domain);

    if let Some(origin) = policy::resolve_allowed_origin(config, request_headers) {
        cors::apply_cors(response_headers, &origin, config);
    }

    location::rewrite_location_header(response_headers, config);
}
