//! Configuration validation.
//!
//! Semantic checks that serde cannot express. Every problem is reported, not
//! just the first, so an operator can fix a bad invocation in one pass.

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::Settings;

/// A single semantic problem in the settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target URL is required")]
    MissingTarget,

    #[error("invalid target URL {url:?}: {reason}")]
    InvalidTarget { url: String, reason: String },

    #[error("target URL scheme must be http or https, got {0:?}")]
    UnsupportedScheme(String),

    #[error("target URL {0:?} has no host")]
    MissingHost(String),

    #[error("{field} is not a valid header value: {value:?}")]
    InvalidHeaderValue { field: &'static str, value: String },
}

/// Validate settings, returning the parsed upstream URL on success.
pub fn validate_settings(settings: &Settings) -> Result<Url, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let url = match settings.target.as_deref() {
        None | Some("") => {
            errors.push(ValidationError::MissingTarget);
            None
        }
        Some(raw) => match Url::parse(raw) {
            Ok(url) => check_target(&url, &mut errors).then_some(url),
            Err(e) => {
                errors.push(ValidationError::InvalidTarget {
                    url: raw.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        },
    };

    let header_fields = [
        ("host", Some(settings.host.as_str())),
        ("cookie_domain", settings.cookie_domain.as_deref()),
        ("cors.allow_origin", Some(settings.cors.allow_origin.as_str())),
        ("cors.allow_headers", Some(settings.cors.allow_headers.as_str())),
        ("cors.allow_methods", Some(settings.cors.allow_methods.as_str())),
        ("replace_location", settings.replace_location.as_deref()),
    ];
    for (field, value) in header_fields {
        if let Some(value) = value {
            if HeaderValue::from_str(value).is_err() {
                errors.push(ValidationError::InvalidHeaderValue {
                    field,
                    value: value.to_string(),
                });
            }
        }
    }

    match url {
        Some(url) if errors.is_empty() => Ok(url),
        _ => Err(errors),
    }
}

fn check_target(url: &Url, errors: &mut Vec<ValidationError>) -> bool {
    let before = errors.len();
    if !matches!(url.scheme(), "http" | "https") {
        errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        errors.push(ValidationError::MissingHost(url.to_string()));
    }
    errors.len() == before
}
