//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request_id.rs (assign / propagate x-request-id)
//!     → access_log.rs (one log line per request)
//!     → forward.rs (copy request, hooks, dispatch)
//!         → rewrite::Rewriter (director + response transformer)
//!     → client.rs (pooled HTTP/HTTPS upstream client)
//!     → Send to client
//! ```

pub mod access_log;
pub mod client;
pub mod forward;
pub mod request_id;
pub mod server;

pub use forward::{ForwardHooks, Forwarder};
pub use request_id::X_REQUEST_ID;
pub use server::HttpServer;
