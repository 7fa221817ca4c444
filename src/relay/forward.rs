//! Concurrent fan-out of the extracted metadata to every endpoint.
//!
//! One task is spawned per endpoint so a slow target does not delay the
//! others, and each call is bounded by the configured timeout. Results are
//! collected by awaiting the task handles in configured order, which keeps
//! the [`AnswerSet`] in endpoint order regardless of response latency.
//! Response bodies are read up to the configured size and no further.
//! A failing endpoint only ever costs its own answer.

use std::time::{Duration, Instant};

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use serde_json::Value;

use super::aggregate::{first_answer, AnswerSet};
use super::extract::JSON_MEDIA_TYPE;
use crate::config::model::Endpoint;
use crate::error::EndpointError;
use crate::server::HttpClient;

pub struct ForwardRequest<'a> {
    pub client: &'a HttpClient,
    pub endpoints: &'a [Endpoint],
    pub metadata: &'a Value,
    pub timeout: Duration,
    pub max_answer_body: usize,
    pub correlation_id: &'a str,
}

#[derive(Debug)]
pub struct EndpointResult {
    pub url: String,
    pub latency_ms: u64,
    pub outcome: Result<Option<Value>, EndpointError>,
}

pub async fn forward(req: ForwardRequest<'_>) -> AnswerSet {
    let body = match serde_json::to_vec(req.metadata) {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            tracing::error!(
                correlation_id = %req.correlation_id,
                error = %e,
                "failed to serialize metadata"
            );
            return AnswerSet::new();
        }
    };

    let handles: Vec<_> = req
        .endpoints
        .iter()
        .map(|endpoint| {
            let client = req.client.clone();
            let url = endpoint.url.clone();
            let body = body.clone();
            let limits = CallLimits {
                timeout: req.timeout,
                max_body: req.max_answer_body,
            };
            let correlation_id = req.correlation_id.to_string();
            tokio::spawn(call_endpoint(client, url, body, limits, correlation_id))
        })
        .collect();

    let mut answers = AnswerSet::with_capacity(handles.len());
    for (endpoint, handle) in req.endpoints.iter().zip(handles) {
        let result = match handle.await {
            Ok(result) => result,
            Err(join_err) => {
                tracing::error!(
                    correlation_id = %req.correlation_id,
                    endpoint = %endpoint.url,
                    error = %join_err,
                    "endpoint task panicked"
                );
                continue;
            }
        };

        match result.outcome {
            Ok(Some(answer)) => {
                tracing::info!(
                    correlation_id = %req.correlation_id,
                    endpoint = %result.url,
                    latency_ms = result.latency_ms,
                    "received answer to transfer request"
                );
                answers.push(answer);
            }
            Ok(None) => {
                tracing::warn!(
                    correlation_id = %req.correlation_id,
                    endpoint = %result.url,
                    latency_ms = result.latency_ms,
                    "received no answer to transfer request"
                );
            }
            Err(e) => {
                tracing::warn!(
                    correlation_id = %req.correlation_id,
                    endpoint = %result.url,
                    latency_ms = result.latency_ms,
                    error = %e,
                    "transfer request failed"
                );
            }
        }
    }

    answers
}

#[derive(Debug, Clone, Copy)]
struct CallLimits {
    timeout: Duration,
    max_body: usize,
}

#[allow(clippy::cast_possible_truncation)]
async fn call_endpoint(
    client: HttpClient,
    url: String,
    body: Bytes,
    limits: CallLimits,
    correlation_id: String,
) -> EndpointResult {
    let timeout = limits.timeout;
    let start = Instant::now();
    tracing::debug!(correlation_id = %correlation_id, endpoint = %url, "transfer request");

    let call = post_json(&client, &url, body, limits.max_body, &correlation_id);
    let outcome = match tokio::time::timeout(timeout, call).await {
        Ok(outcome) => outcome,
        Err(_) => Err(EndpointError::Timeout(timeout.as_millis() as u64)),
    };

    EndpointResult {
        url,
        latency_ms: start.elapsed().as_millis() as u64,
        outcome,
    }
}

async fn post_json(
    client: &HttpClient,
    url: &str,
    body: Bytes,
    max_body: usize,
    correlation_id: &str,
) -> Result<Option<Value>, EndpointError> {
    let uri: hyper::Uri = url
        .parse()
        .map_err(|source| EndpointError::InvalidUri { source })?;

    let mut builder = hyper::Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
    if let Ok(val) = HeaderValue::from_str(correlation_id) {
        builder = builder.header("x-correlation-id", val);
    }
    let request = builder
        .body(Full::new(body))
        .map_err(|e| EndpointError::Unreachable {
            source: Box::new(e),
        })?;

    let response = client
        .request(request)
        .await
        .map_err(|e| EndpointError::Unreachable {
            source: Box::new(e),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(EndpointError::BadStatus(status));
    }

    let bytes = Limited::new(response.into_body(), max_body)
        .collect()
        .await
        .map_err(|source| EndpointError::BodyRead { source })?
        .to_bytes();

    first_answer(&bytes)
}
