//! Single-target reverse proxy that rehosts a backend behind another origin.
//!
//! Requests are forwarded to one upstream with their path prefix stripped and
//! `Host` rewritten; responses come back with `Set-Cookie` domains, CORS
//! headers and `Location` redirects rewritten for the public origin.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
