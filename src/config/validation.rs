//! Configuration validation.
//!
//! [`validate`] collects every problem in a [`Config`] instead of stopping
//! at the first one, so a single run reports all of them.

use url::Url;

use crate::config::model::Config;
use crate::error::ValidationError;

/// Validate a single endpoint URL. Returns `Ok(())` or a human-readable error.
pub fn validate_endpoint_url(url: &str) -> Result<(), String> {
    if url.trim().is_empty() {
        return Err("endpoint URL cannot be empty".into());
    }
    match Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else if parsed.host_str().is_none() {
                Err(format!("'{url}' has no host"))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{url}' is not a valid URL")),
    }
}

pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.endpoints.is_empty() {
        errors.push(ValidationError {
            field: "endpoints".into(),
            message: "at least one endpoint must be configured".into(),
            suggestion: Some("pass --url http://host:port/path".into()),
        });
    }

    for (i, endpoint) in config.endpoints.iter().enumerate() {
        if let Err(msg) = validate_endpoint_url(&endpoint.url) {
            let suggestion = if !endpoint.url.is_empty() && !endpoint.url.contains("://") {
                Some(format!("did you mean 'http://{}'?", endpoint.url))
            } else {
                None
            };
            errors.push(ValidationError {
                field: format!("endpoints[{i}]"),
                message: msg,
                suggestion,
            });
        }
    }

    if config.timeout == 0 {
        errors.push(ValidationError {
            field: "timeout".into(),
            message: "timeout must be greater than 0ms".into(),
            suggestion: None,
        });
    }

    if config.max_answer_body == 0 {
        errors.push(ValidationError {
            field: "max_answer_body".into(),
            message: "endpoint response limit must be greater than 0 bytes".into(),
            suggestion: None,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(config: &Config) -> String {
    let mut lines = vec![format!(
        "configuration is valid\n  {} endpoints, timeout {}ms\n",
        config.total_endpoints(),
        config.timeout
    )];
    for (i, endpoint) in config.endpoints.iter().enumerate() {
        lines.push(format!("  {}. {}", i + 1, endpoint.url));
    }
    lines.join("\n")
}
