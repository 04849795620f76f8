//! Observability subsystem.
//!
//! Structured log events via `tracing`: startup summary, one access-log line
//! per request, upstream failures, and rewrite decisions at debug level.

pub mod logging;
