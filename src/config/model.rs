//! Data structures for the relay configuration.
//!
//! Contains [`Config`] (the root) and [`Endpoint`]. The configuration is
//! built once from the command line and shared read-only afterwards.

use serde::Serialize;

pub const DEFAULT_MAX_ANSWER_BODY: usize = 1_048_576;

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Downstream targets, in the order their answers are reported.
    pub endpoints: Vec<Endpoint>,

    /// Per-endpoint timeout in milliseconds.
    pub timeout: u64,

    /// Largest endpoint response body read, in bytes.
    pub max_answer_body: usize,
}

impl Config {
    #[must_use]
    pub fn from_urls<I, S>(urls: I, timeout: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            endpoints: urls
                .into_iter()
                .map(|u| Endpoint { url: u.into() })
                .collect(),
            timeout,
            max_answer_body: DEFAULT_MAX_ANSWER_BODY,
        }
    }

    #[must_use]
    pub const fn with_max_answer_body(mut self, max_answer_body: usize) -> Self {
        self.max_answer_body = max_answer_body;
        self
    }

    #[must_use]
    pub fn total_endpoints(&self) -> usize {
        self.endpoints.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub url: String,
}
