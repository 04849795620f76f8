//! Errors surfaced past the rewriting pipeline.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Body of every failed-dispatch response.
pub const BAD_GATEWAY_BODY: &str = "proxy error";

/// Failure to relay a request. Always answered with `502 Bad Gateway`.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not answer within {0:?}")]
    Timeout(std::time::Duration),

    #[error("could not build upstream request: {0}")]
    InvalidRequest(#[from] axum::http::Error),

    #[error("response hook aborted relaying: {0}")]
    Hook(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_GATEWAY,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            BAD_GATEWAY_BODY,
        )
            .into_response()
    }
}
