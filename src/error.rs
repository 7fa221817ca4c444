//! Unified error types for the relay.
//!
//! [`RelayError`] covers startup and subcommand failures, [`ExtractError`]
//! the decoding of an inbound multipart body, and [`EndpointError`] a single
//! failed call to a downstream endpoint. [`ValidationError`] reports one
//! configuration problem. All use `thiserror` for `Display` and `Error`.

use std::path::PathBuf;

use http::StatusCode;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    use std::fmt::Write;
    let mut buf = String::new();
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            buf.push('\n');
        }
        // write! to String is infallible (only fails on OOM which is unrecoverable)
        let _ = write!(buf, "{e}");
    }
    buf
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PID file error ({}): {source}", path.display())]
    PidFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Detached relay exited during startup ({0}); see --log-file for details")]
    DaemonExited(std::process::ExitStatus),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(StatusCode),
}

/// Failure to obtain metadata from an inbound request body.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("request is not of type multipart ({content_type})")]
    NotMultipart { content_type: String },

    #[error("request body of {length} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { length: u64, limit: usize },

    #[error("multipart body could not be decoded: {0}")]
    Multipart(#[from] multer::Error),

    #[error("JSON part is malformed: {0}")]
    MalformedJsonPart(#[source] serde_json::Error),
}

/// Failure of one endpoint call. Never escapes the forwarder.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid endpoint URI: {source}")]
    InvalidUri {
        #[source]
        source: hyper::http::uri::InvalidUri,
    },

    #[error("endpoint unreachable: {source}")]
    Unreachable {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("endpoint answered with status {0}")]
    BadStatus(StatusCode),

    #[error("body read error: {source}")]
    BodyRead {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("response body is not JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("response body is not a JSON array")]
    NotAnArray,
}
