//! Configuration schema definitions.
//!
//! [`Settings`] is the raw, deserializable shape shared by the TOML file and
//! the command line. [`ProxyConfig`] is what the rest of the proxy sees: every
//! default derived, every value validated, never mutated after startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::validation::{validate_settings, ValidationError};

/// Raw proxy settings before derivation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Host interface to listen on.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Upstream base URL (required).
    pub target: Option<String>,

    /// Replacement for `Domain=` in `Set-Cookie` (empty = host).
    pub cookie_domain: Option<String>,

    /// Prefix removed from incoming request paths.
    pub strip_prefix: String,

    /// Skip certificate verification for HTTPS upstreams.
    pub insecure: bool,

    /// CORS overrides.
    pub cors: CorsSettings,

    /// `"old:new"` host pair for `Location` rewriting.
    pub replace_location: Option<String>,

    /// Set to false to leave `Location` headers untouched.
    pub rewrite_location: bool,

    /// Timeout configuration.
    pub timeouts: TimeoutSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 80,
            target: None,
            cookie_domain: None,
            strip_prefix: String::new(),
            insecure: false,
            cors: CorsSettings::default(),
            replace_location: None,
            rewrite_location: true,
            timeouts: TimeoutSettings::default(),
        }
    }
}

/// CORS override values. Empty strings mean "no override".
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsSettings {
    pub allow_origin: String,
    pub allow_headers: String,
    pub allow_methods: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Total time allowed for one request/response in seconds.
    pub request_secs: u64,

    /// Time allowed for draining in-flight requests on shutdown.
    pub shutdown_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_secs: 10,
        }
    }
}

/// The single upstream origin every request is dispatched to.
#[derive(Debug, Clone)]
pub struct Upstream {
    /// Full base URL, including any base path and query.
    pub url: Url,

    /// `host[:port]` as used for the outbound `Host` header.
    pub authority: String,
}

impl Upstream {
    pub fn is_https(&self) -> bool {
        self.url.scheme() == "https"
    }
}

/// Resolved, immutable proxy configuration.
///
/// Built once by [`Settings::resolve`] and shared behind an `Arc` by every
/// in-flight request.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub listen_host: String,
    pub listen_port: u16,
    pub upstream: Upstream,

    /// Always non-empty; defaults to `listen_host`.
    pub cookie_domain: String,

    /// Never ends with `/`. Empty disables stripping.
    pub strip_prefix: String,

    pub insecure_tls: bool,

    /// Fixed `Access-Control-Allow-Origin`; empty means infer per request.
    pub cors_origin: String,
    pub cors_allow_headers: String,
    pub cors_allow_methods: String,

    /// Empty disables `Location` rewriting entirely.
    pub location_old_host: String,
    pub location_new_host: String,

    pub request_timeout: Duration,
    pub shutdown_timeout: Duration,
}

impl ProxyConfig {
    /// Address the listener binds to.
    pub fn listen_address(&self) -> String {
        join_host_port(&self.listen_host, self.listen_port)
    }

    pub fn location_rewrite_enabled(&self) -> bool {
        !self.location_old_host.is_empty()
    }
}

impl Settings {
    /// Validate the settings and derive every defaulted field.
    pub fn resolve(self) -> Result<ProxyConfig, Vec<ValidationError>> {
        let url = validate_settings(&self)?;
        let authority = authority_of(&url);
        let public_host = join_host_port(&self.host, self.port);

        let cookie_domain = match self.cookie_domain {
            Some(domain) if !domain.is_empty() => domain,
            _ => self.host.clone(),
        };

        let (location_old_host, location_new_host) = if self.rewrite_location {
            let (old, new) = split_replace_location(self.replace_location.as_deref());
            let old = if old.is_empty() { authority.clone() } else { old };
            let new = if new.is_empty() { public_host } else { new };
            (old, new)
        } else {
            (String::new(), String::new())
        };

        Ok(ProxyConfig {
            listen_host: self.host,
            listen_port: self.port,
            upstream: Upstream { url, authority },
            cookie_domain,
            strip_prefix: self.strip_prefix.trim_end_matches('/').to_string(),
            insecure_tls: self.insecure,
            cors_origin: self.cors.allow_origin,
            cors_allow_headers: self.cors.allow_headers,
            cors_allow_methods: self.cors.allow_methods,
            location_old_host,
            location_new_host,
            request_timeout: Duration::from_secs(self.timeouts.request_secs),
            shutdown_timeout: Duration::from_secs(self.timeouts.shutdown_secs),
        })
    }
}

/// Split an `"old:new"` pair on its first colon.
pub(crate) fn split_replace_location(raw: Option<&str>) -> (String, String) {
    match raw {
        None | Some("") => (String::new(), String::new()),
        Some(raw) => match raw.split_once(':') {
            Some((old, new)) => (old.to_string(), new.to_string()),
            None => (raw.to_string(), String::new()),
        },
    }
}

/// `host[:port]` of a URL, keeping an explicit non-default port.
pub(crate) fn authority_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Join host and port, bracketing IPv6 literals.
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}
