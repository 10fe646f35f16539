//! Mock upstream services for integration tests
//!
//! Serves an OpenAI-compatible chat completions route and a Suno-API-style
//! generation/lookup API from one listener, recording every call.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Which upstream routes should answer with 500
#[derive(Debug, Default, Clone, Copy)]
pub struct Failures {
    pub derive: bool,
    pub generate: bool,
    pub lookup: bool,
}

/// Running mock upstream
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    failures: Failures,
    derived_content: String,
    generated: Value,
    tracks: Value,
    completions: Mutex<Vec<Value>>,
    generations: Mutex<Vec<Value>>,
    lookups: Mutex<Vec<Option<String>>>,
}

/// Builder for a mock upstream with canned responses
pub struct MockUpstreamBuilder {
    failures: Failures,
    derived_content: String,
    generated: Value,
    tracks: Value,
}

impl MockUpstreamBuilder {
    pub fn failing(mut self, failures: Failures) -> Self {
        self.failures = failures;
        self
    }

    /// Message content returned by the chat completions route
    pub fn derived_content(mut self, content: &str) -> Self {
        self.derived_content = content.to_owned();
        self
    }

    pub fn tracks(mut self, tracks: Value) -> Self {
        self.tracks = tracks;
        self
    }

    pub async fn start(self) -> anyhow::Result<MockUpstream> {
        let state = Arc::new(MockState {
            failures: self.failures,
            derived_content: self.derived_content,
            generated: self.generated,
            tracks: self.tracks,
            completions: Mutex::new(Vec::new()),
            generations: Mutex::new(Vec::new()),
            lookups: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .route("/api/custom_generate", routing::post(handle_custom_generate))
            .route("/api/get", routing::get(handle_get))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(MockUpstream { addr, shutdown, state })
    }
}

impl MockUpstream {
    pub fn builder() -> MockUpstreamBuilder {
        MockUpstreamBuilder {
            failures: Failures::default(),
            derived_content: r#"{"prompt":"p","tags":"t"}"#.to_owned(),
            generated: json!([{ "id": "x1" }]),
            tracks: json!([{ "id": "x1" }]),
        }
    }

    /// Start with canned successful responses
    pub async fn start() -> anyhow::Result<Self> {
        Self::builder().start().await
    }

    /// Base URL for the prompt service, including `/v1`
    pub fn prompt_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Base URL for the audio service
    pub fn audio_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Chat completion request bodies received
    pub fn completions(&self) -> Vec<Value> {
        self.state.completions.lock().unwrap().clone()
    }

    /// Generation request bodies received
    pub fn generations(&self) -> Vec<Value> {
        self.state.generations.lock().unwrap().clone()
    }

    /// Raw `ids` query values received by the lookup route
    pub fn lookups(&self) -> Vec<Option<String>> {
        self.state.lookups.lock().unwrap().clone()
    }

    /// Total upstream calls of any kind
    pub fn total_calls(&self) -> usize {
        self.completions().len() + self.generations().len() + self.lookups().len()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn upstream_failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "mock failure" }))).into_response()
}

async fn handle_chat_completions(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.completions.lock().unwrap().push(body);

    if state.failures.derive {
        return upstream_failure();
    }

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": state.derived_content },
            "finish_reason": "stop",
        }],
    }))
    .into_response()
}

async fn handle_custom_generate(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.generations.lock().unwrap().push(body);

    if state.failures.generate {
        return upstream_failure();
    }

    Json(state.generated.clone()).into_response()
}

async fn handle_get(State(state): State<Arc<MockState>>, Query(query): Query<HashMap<String, String>>) -> Response {
    state.lookups.lock().unwrap().push(query.get("ids").cloned());

    if state.failures.lookup {
        return upstream_failure();
    }

    Json(state.tracks.clone()).into_response()
}
