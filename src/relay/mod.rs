//! Inbound request handling.
//!
//! [`relay_handler`] serves `POST /`. Each request moves through decoding
//! ([`multipart`]), metadata extraction ([`extract`]), fan-out to the
//! configured endpoints ([`forward`]) and answer aggregation
//! ([`aggregate`]). Any stage may end the request with a [`Failure`],
//! which is always answered with a status code.

pub mod aggregate;
pub mod extract;
pub mod forward;
pub mod multipart;

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::ExtractError;
use crate::server::AppState;

/// Terminal failure of one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    NotMultipart,
    NoMetadata,
    NoAnswers,
}

impl Failure {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::NotMultipart | Self::NoMetadata => StatusCode::BAD_REQUEST,
            Self::NoAnswers => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&ExtractError> for Failure {
    fn from(err: &ExtractError) -> Self {
        match err {
            ExtractError::NotMultipart { .. } => Self::NotMultipart,
            ExtractError::BodyTooLarge { .. }
            | ExtractError::Multipart(_)
            | ExtractError::MalformedJsonPart(_) => Self::NoMetadata,
        }
    }
}

pub async fn relay_handler(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req_headers: HeaderMap,
    body: Body,
) -> Response {
    let correlation_id = req_headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    let outcome = relay(&state, &req_headers, body, &correlation_id, addr).await;

    let mut response = match outcome {
        Ok(answers) => {
            state.stats.relayed.fetch_add(1, Ordering::Relaxed);
            tracing::info!(
                correlation_id = %correlation_id,
                answers = answers.as_array().map_or(0, Vec::len),
                "return answer from transfer request"
            );
            (StatusCode::OK, Json(answers)).into_response()
        }
        Err(failure) => {
            let counter = match failure {
                Failure::NoAnswers => &state.stats.failed,
                Failure::NotMultipart | Failure::NoMetadata => &state.stats.rejected,
            };
            counter.fetch_add(1, Ordering::Relaxed);
            failure.status().into_response()
        }
    };

    if let Ok(val) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert("x-correlation-id", val);
    }
    response
}

async fn relay(
    state: &AppState,
    req_headers: &HeaderMap,
    body: Body,
    correlation_id: &str,
    addr: SocketAddr,
) -> Result<serde_json::Value, Failure> {
    let mut parts = match multipart::decode(req_headers, body, state.max_body) {
        Ok(parts) => parts,
        Err(e) => {
            if matches!(e, ExtractError::NotMultipart { .. }) {
                tracing::warn!(correlation_id = %correlation_id, error = %e, "request is not of type multipart");
            }
            tracing::error!(correlation_id = %correlation_id, error = %e, "no data to transfer received");
            return Err(Failure::from(&e));
        }
    };

    tracing::info!(
        correlation_id = %correlation_id,
        client = %addr,
        endpoints = state.config.total_endpoints(),
        "multipart request received"
    );

    let metadata = match extract::extract_metadata(&mut parts, correlation_id).await {
        Ok(Some(metadata)) if aggregate::is_truthy(&metadata) => metadata,
        Ok(Some(_)) => {
            tracing::error!(correlation_id = %correlation_id, "extracted metadata is empty");
            return Err(Failure::NoMetadata);
        }
        Ok(None) => {
            tracing::error!(correlation_id = %correlation_id, "no data to transfer received");
            return Err(Failure::NoMetadata);
        }
        Err(e) => {
            tracing::error!(correlation_id = %correlation_id, error = %e, "no data to transfer received");
            return Err(Failure::from(&e));
        }
    };
    // Remaining parts are never read.
    drop(parts);

    let answers = forward::forward(forward::ForwardRequest {
        client: &state.http_client,
        endpoints: &state.config.endpoints,
        metadata: &metadata,
        timeout: Duration::from_millis(state.config.timeout),
        max_answer_body: state.config.max_answer_body,
        correlation_id,
    })
    .await;

    aggregate::aggregate(answers).inspect_err(|_| {
        tracing::error!(correlation_id = %correlation_id, "no answer from transfer received");
    })
}
