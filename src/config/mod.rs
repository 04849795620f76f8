//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (Settings::default)
//!     → loader.rs (optional TOML file via --config)
//!     → cli.rs (flags override file values)
//!     → validation.rs (semantic checks, all errors collected)
//!     → schema.rs Settings::resolve (derive cookie domain, location pair)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to the rewriting pipeline and the server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved; there is no reload
//! - All fields have defaults except the upstream target
//! - An invalid configuration is fatal at startup

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{load_config, ConfigError};
pub use schema::{ProxyConfig, Settings, Upstream};
pub use validation::ValidationError;
