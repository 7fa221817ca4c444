//! Shared helpers: stub downstream endpoints and a relay server on a free port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use tokio::sync::Mutex;

use multipart_relay::config::model::Config;
use multipart_relay::server::{self, AppState};

/// One request as seen by a stub endpoint.
#[derive(Debug, Clone)]
pub struct Received {
    pub content_type: Option<String>,
    pub correlation_id: Option<String>,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct StubEndpoint {
    status: StatusCode,
    body: String,
    delay: Duration,
}

struct StubState {
    stub: StubEndpoint,
    received: Arc<Mutex<Vec<Received>>>,
}

impl StubEndpoint {
    /// Answers `200` with the given JSON text.
    #[must_use]
    pub fn json(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Serve on a free port; returns the endpoint URL and the request log.
    pub async fn start(self) -> (String, Arc<Mutex<Vec<Received>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(StubState {
            stub: self,
            received: Arc::clone(&received),
        });

        let router = Router::new()
            .route("/api", post(stub_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (format!("http://{addr}/api"), received)
    }
}

async fn stub_handler(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let text = |name| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    state.received.lock().await.push(Received {
        content_type: text(header::CONTENT_TYPE.as_str()),
        correlation_id: text("x-correlation-id"),
        body,
    });

    if !state.stub.delay.is_zero() {
        tokio::time::sleep(state.stub.delay).await;
    }

    (
        state.stub.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.stub.body.clone(),
    )
}

/// A URL nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

pub async fn start_relay(config: Config) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    start_relay_with_limit(config, 1_048_576).await
}

/// Like [`start_relay`] with an explicit inbound body limit.
pub async fn start_relay_with_limit(
    config: Config,
    max_body: usize,
) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let state = Arc::new(AppState::new(config, max_body));
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .unwrap();
    });

    (addr, shutdown_tx)
}

/// Multipart form with one `application/json` section.
pub fn json_form(json: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("note", "ignored")
        .part(
            "metadata",
            reqwest::multipart::Part::text(json.to_string())
                .mime_str("application/json")
                .unwrap(),
        )
}
