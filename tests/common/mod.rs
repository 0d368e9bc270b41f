//! Shared fixtures for integration tests
//!
//! `StubServer` is a small axum app on a local port serving `POST /query`.
//! It records every request it receives and answers each one through a
//! responder closure, so tests can see exactly what went over the wire.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use vassist::query::{DispatchOutcome, QueryDispatcher};

/// A request as seen by the stub
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: serde_json::Value,
}

type Responder = dyn Fn(&RecordedRequest) -> (u16, String) + Send + Sync;

#[derive(Clone)]
struct StubState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Arc<Responder>,
}

pub struct StubServer {
    port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    /// Answer every request with the same status and body
    pub fn fixed(status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::start(move |_| (status, body.clone()))
    }

    /// Answer with `{"response": <input>}`
    pub fn echo() -> Self {
        Self::start(|request| {
            let input = request.body["input"].as_str().unwrap_or_default();
            (200, serde_json::json!({ "response": input }).to_string())
        })
    }

    pub fn start(
        responder: impl Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
    ) -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        listener.set_nonblocking(true).expect("nonblocking listener");
        let port = listener.local_addr().expect("local addr").port();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            requests: Arc::clone(&requests),
            responder: Arc::new(responder),
        };

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("stub runtime");

            runtime.block_on(async move {
                let listener = TcpListener::from_std(listener).expect("tokio listener");
                let app = Router::new()
                    .route("/query", post(handle_query))
                    .with_state(state);
                let _ = axum::serve(listener, app).await;
            });
        });

        Self { port, requests }
    }

    /// Base URL suitable for `AssistConfig::with_backend_url`
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

async fn handle_query(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let request = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    };

    let (status, reply) = (state.responder)(&request);
    state.requests.lock().push(request);

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], reply)
}

/// Poll the dispatcher until nothing is pending, collecting outcomes
pub fn wait_for_outcomes(dispatcher: &mut QueryDispatcher) -> Vec<DispatchOutcome> {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut outcomes = Vec::new();

    while Instant::now() < deadline {
        outcomes.extend(dispatcher.poll());
        if !dispatcher.is_pending() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    outcomes
}
