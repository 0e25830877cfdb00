//! Test utilities for claimdesk-core
//!
//! This module provides a mock OpenAI chat completions server that can be used
//! for development and integration tests without network access or a key.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// What the mock server answers to chat completion calls
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with this text as the first choice's message content
    Content(String),
    /// Non-2xx status with this body
    Status(u16, String),
    /// 200 with an empty `choices` array
    EmptyChoices,
    /// Sleep, then answer with this content
    Delayed(Duration, String),
}

impl MockReply {
    /// A well-formed insights reply
    pub fn valid_insights() -> Self {
        MockReply::Content(
            json!({
                "insights": [
                    {"insight": "Most claims close within two weeks.", "confidenceScore": 0.8, "category": "efficiency"},
                    {"insight": "Missing paperwork is the top delay.", "confidenceScore": 0.7, "category": "risk"},
                    {"insight": "Damage claims are trending up.", "confidenceScore": 0.55, "category": "trend"}
                ],
                "recommendations": [
                    {"recommendation": "Request photos at intake.", "priority": "high", "impactArea": "documentation", "estimatedImpact": "Fewer follow-ups"},
                    {"recommendation": "Batch carrier calls daily.", "priority": "medium", "impactArea": "communication", "estimatedImpact": "Faster responses"},
                    {"recommendation": "Auto-close idle tasks.", "priority": "low", "impactArea": "process", "estimatedImpact": "Cleaner task list"}
                ],
                "summaryText": "Claims flow well; documentation gaps cause most delays."
            })
            .to_string(),
        )
    }
}

struct MockState {
    reply: MockReply,
    api_key: Option<String>,
    requests: Mutex<Vec<Value>>,
}

impl MockState {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        let Some(ref key) = self.api_key else {
            return true;
        };
        headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|v| v == key)
    }
}

/// Mock OpenAI server for testing and development
pub struct MockOpenAIServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOpenAIServer {
    /// Start the mock server on an available port, accepting any bearer key
    pub async fn start(reply: MockReply) -> Self {
        Self::spawn(reply, None).await
    }

    /// Start the mock server, rejecting requests without this bearer key (401)
    pub async fn start_with_key(reply: MockReply, api_key: &str) -> Self {
        Self::spawn(reply, Some(api_key.to_string())).await
    }

    async fn spawn(reply: MockReply, api_key: Option<String>) -> Self {
        let state = Arc::new(MockState {
            reply,
            api_key,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Bodies of all chat completion requests received so far
    pub fn requests(&self) -> Vec<Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOpenAIServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": {
                "message": "Incorrect API key provided.",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        })),
    )
        .into_response()
}

fn completion(content: &str) -> Response {
    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": "mock",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}

/// Model list endpoint (health check)
async fn handle_models(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "object": "list",
        "data": [{"id": "gpt-4o", "object": "model", "owned_by": "mock"}]
    }))
    .into_response()
}

/// Chat completions endpoint
async fn handle_chat(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return unauthorized();
    }
    state.requests.lock().unwrap().push(body);

    match &state.reply {
        MockReply::Content(content) => completion(content),
        MockReply::Status(code, message) => (
            StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message.clone(),
        )
            .into_response(),
        MockReply::EmptyChoices => {
            Json(json!({"id": "chatcmpl-mock", "object": "chat.completion", "choices": []}))
                .into_response()
        }
        MockReply::Delayed(delay, content) => {
            tokio::time::sleep(*delay).await;
            completion(content)
        }
    }
}
