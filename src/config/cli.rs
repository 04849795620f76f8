//! Command-line flags.
//!
//! Every flag is optional at the clap level so that values from a `--config`
//! file are only overridden when the flag is actually given.

use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::Settings;

#[derive(Debug, Default, Parser)]
#[command(name = "rehost-proxy")]
#[command(about = "Single-target reverse proxy that rewrites cookies, CORS and redirects", long_about = None)]
pub struct Cli {
    /// TOML file with default settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Host interface to listen on [default: localhost]
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on [default: 80]
    #[arg(long)]
    pub port: Option<u16>,

    /// Target base URL (required)
    #[arg(long)]
    pub target: Option<String>,

    /// Override Domain attribute in Set-Cookie headers (defaults to host)
    #[arg(long)]
    pub cookie_domain: Option<String>,

    /// Prefix to remove from incoming request paths
    #[arg(long)]
    pub strip_prefix: Option<String>,

    /// Disable TLS verification when proxying HTTPS targets
    #[arg(long)]
    pub insecure: bool,

    /// Override Access-Control-Allow-Origin header (empty = infer from request)
    #[arg(long)]
    pub cors_allow_origin: Option<String>,

    /// Override Access-Control-Allow-Headers header (empty = use default)
    #[arg(long)]
    pub cors_allow_headers: Option<String>,

    /// Override Access-Control-Allow-Methods header (empty = use default)
    #[arg(long)]
    pub cors_allow_methods: Option<String>,

    /// Replace domain in Location header: "old:new". Empty old = target host,
    /// empty new = host:port
    #[arg(long)]
    pub replace_location: Option<String>,

    /// Leave Location headers untouched
    #[arg(long)]
    pub no_rewrite_location: bool,

    /// Request timeout in seconds [default: 30]
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Graceful shutdown deadline in seconds [default: 10]
    #[arg(long)]
    pub shutdown_timeout_secs: Option<u64>,
}

impl Cli {
    /// Overlay the given flags onto `settings`.
    pub fn apply(self, mut settings: Settings) -> Settings {
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if self.target.is_some() {
            settings.target = self.target;
        }
        if self.cookie_domain.is_some() {
            settings.cookie_domain = self.cookie_domain;
        }
        if let Some(prefix) = self.strip_prefix {
            settings.strip_prefix = prefix;
        }
        if self.insecure {
            settings.insecure = true;
        }
        if let Some(origin) = self.cors_allow_origin {
            settings.cors.allow_origin = origin;
        }
        if let Some(headers) = self.cors_allow_headers {
            settings.cors.allow_headers = headers;
        }
        if let Some(methods) = self.cors_allow_methods {
            settings.cors.allow_methods = methods;
        }
        if self.replace_location.is_some() {
            settings.replace_location = self.replace_location;
        }
        if self.no_rewrite_location {
            settings.rewrite_location = false;
        }
        if let Some(secs) = self.request_timeout_secs {
            settings.timeouts.request_secs = secs;
        }
        if let Some(secs) = self.shutdown_timeout_secs {
            settings.timeouts.shutdown_secs = secs;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_original_flags() {
        let cli = Cli::parse_from([
            "rehost-proxy",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--target",
            "https://upstream.internal",
            "--strip-prefix",
            "/api",
            "--insecure",
            "--cors-allow-headers",
            "X-Test-Header",
            "--replace-location",
            ":",
        ]);

        let settings = cli.apply(Settings::default());
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.target.as_deref(), Some("https://upstream.internal"));
        assert!(settings.insecure);
        assert_eq!(settings.cors.allow_headers, "X-Test-Header");
        assert_eq!(settings.replace_location.as_deref(), Some(":"));
    }

    #[test]
    fn test_flags_override_file_values_only_when_given() {
        let file = Settings {
            port: 9000,
            cookie_domain: Some("file.example".into()),
            ..Settings::default()
        };
        let cli = Cli::parse_from(["rehost-proxy", "--cookie-domain", "flag.example"]);

        let settings = cli.apply(file);
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.cookie_domain.as_deref(), Some("flag.example"));
        assert!(settings.rewrite_location);
    }

    #[test]
    fn test_no_rewrite_location() {
        let cli = Cli::parse_from(["rehost-proxy", "--no-rewrite-location"]);
        assert!(!cli.apply(Settings::default()).rewrite_location);
    }
}
