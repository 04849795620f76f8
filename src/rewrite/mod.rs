//! Header rewriting pipeline.
//!
//! # Data Flow
//! ```text
//! client request
//!     → director.rs (strip prefix, Host = upstream)
//!     → [forwarding engine dispatches upstream]
//! upstream response
//!     → transform.rs
//!         → cookie.rs   (Set-Cookie Domain)
//!         → policy.rs   (allowed origin?) → cors.rs
//!         → location.rs (redirect host)
//!     → relayed to client
//! ```
//!
//! Everything here is synchronous, performs no I/O and never fails: a header
//! that cannot be rewritten is left as the upstream sent it.

pub mod cookie;
pub mod cors;
pub mod director;
pub mod location;
pub mod policy;
pub mod transform;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, Response};

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::forward::ForwardHooks;

pub use cookie::rewrite_cookie_domain;
pub use cors::apply_cors;
pub use director::prepare_outbound;
pub use location::rewrite_location;
pub use policy::resolve_allowed_origin;
pub use transform::transform_response;

/// Plugs the rewriting pipeline into the forwarding engine.
#[derive(Debug, Clone)]
pub struct Rewriter {
    config: Arc<ProxyConfig>,
}

impl Rewriter {
    pub fn new(config: Arc<ProxyConfig>) -> Self {
        Self { config }
    }
}

impl ForwardHooks for Rewriter {
    fn before_dispatch(&self, request: &mut Request<Body>) {
        prepare_outbound(request, &self.config);
    }

    fn after_receipt(&self, request_headers: &HeaderMap, response: &mut Response<Body>) -> Result<(), ProxyError> {
        transform_response(request_headers, response.headers_mut(), &self.config);
        Ok(())
    }
}
