//! OpenAI backend implementation
//!
//! Talks to the hosted OpenAI chat completions API. Any server implementing
//! `/v1/chat/completions` with `response_format` support works as well
//! (vLLM, LocalAI, Azure-style proxies).
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_API_KEY`: API key (required for calls to succeed)
//! - `OPENAI_BASE_URL`: Server URL (default: https://api.openai.com)
//! - `OPENAI_MODEL`: Model name (default: gpt-4o)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::types::CompletionRequest;
use super::AIBackend;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Longest error body kept in `Error::Api`
const MAX_ERROR_BODY: usize = 500;

/// Upper bound on `GET /v1/models`; server startup and status checks await it
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// OpenAI chat completions backend
#[derive(Clone)]
pub struct OpenAIBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAIBackend {
    /// Create a backend without credentials
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut backend = Self::new(base_url, model);
        backend.api_key = Some(api_key.to_string());
        backend
    }

    /// Create a new instance with a different model, sharing the connection pool
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model.to_string(),
            api_key: self.api_key.clone(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        Self::from_config(
            std::env::var("OPENAI_BASE_URL").ok(),
            std::env::var("OPENAI_MODEL").ok(),
            std::env::var("OPENAI_API_KEY").ok(),
        )
    }

    /// Build from optional settings, applying defaults. Blank values count as unset.
    pub fn from_config(
        base_url: Option<String>,
        model: Option<String>,
        api_key: Option<String>,
    ) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let base_url = non_blank(base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = non_blank(model).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut backend = Self::new(&base_url, &model);
        backend.api_key = non_blank(api_key).map(|k| k.trim().to_string());
        backend
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Structured output directive
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message (content is null on refusals)
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl ChatCompletionRequest {
    fn from_request(model: &str, request: &CompletionRequest) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: request.system.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: request.user.clone(),
                },
            ],
            temperature: request.temperature,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
            stream: false,
        }
    }
}

#[async_trait]
impl AIBackend for OpenAIBackend {
    async fn complete_json(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(Error::MissingApiKey)?;

        let body = ChatCompletionRequest::from_request(&self.model, request);

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
                body.push_str("...");
            }
            return Err(Error::Api { status, body });
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::InvalidData("No response content from OpenAI API".into()))?;

        debug!(model = %self.model, bytes = content.len(), "OpenAI response received");
        Ok(content)
    }

    async fn health_check(&self) -> bool {
        let Some(ref api_key) = self.api_key else {
            return false;
        };

        match self
            .http_client
            .get(format!("{}/v1/models", self.base_url))
            .bearer_auth(api_key)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }

    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockOpenAIServer, MockReply};

    fn request() -> CompletionRequest {
        CompletionRequest::json("You are a claims analyst.", "Analyze: []")
    }

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = OpenAIBackend::new("http://localhost:12434/", "gpt-4o");
        assert_eq!(backend.host(), "http://localhost:12434");
        assert_eq!(backend.model(), "gpt-4o");
        assert!(!backend.has_credentials());
    }

    #[test]
    fn test_from_config_defaults() {
        let backend = OpenAIBackend::from_config(None, Some("  ".into()), Some("".into()));
        assert_eq!(backend.host(), DEFAULT_BASE_URL);
        assert_eq!(backend.model(), DEFAULT_MODEL);
        assert!(!backend.has_credentials());

        let backend = OpenAIBackend::from_config(
            Some("http://proxy:8000/".into()),
            Some("gpt-4o-mini".into()),
            Some(" sk-test ".into()),
        );
        assert_eq!(backend.host(), "http://proxy:8000");
        assert_eq!(backend.model(), "gpt-4o-mini");
        assert_eq!(backend.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_chat_completion_request_serialization() {
        let body = ChatCompletionRequest::from_request("gpt-4o", &request());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "You are a claims analyst.");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["stream"], false);
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_text_mode_omits_response_format() {
        let mut req = request();
        req.json_mode = false;
        let json = serde_json::to_value(ChatCompletionRequest::from_request("gpt-4o", &req)).unwrap();
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_response_with_null_content_deserializes() {
        let json = r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": null, "refusal": "no"}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert!(response.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        // Port 9 (discard) would hang or refuse; we must never get that far
        let backend = OpenAIBackend::new("http://127.0.0.1:9", "gpt-4o");
        let err = backend.complete_json(&request()).await.unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));
        assert!(err.to_string().contains("API key"));
        assert!(!backend.health_check().await);
    }

    #[tokio::test]
    async fn test_complete_json_round_trip() {
        let server =
            MockOpenAIServer::start_with_key(MockReply::Content(r#"{"ok": true}"#.into()), "sk-test")
                .await;
        let backend = OpenAIBackend::with_api_key(&server.url(), "gpt-4o", "sk-test");

        let content = backend.complete_json(&request()).await.unwrap();
        assert_eq!(content, r#"{"ok": true}"#);

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["model"], "gpt-4o");
        assert_eq!(requests[0]["response_format"]["type"], "json_object");
    }

    #[tokio::test]
    async fn test_wrong_key_is_api_error() {
        let server =
            MockOpenAIServer::start_with_key(MockReply::Content("{}".into()), "sk-right").await;
        let backend = OpenAIBackend::with_api_key(&server.url(), "gpt-4o", "sk-wrong");

        let err = backend.complete_json(&request()).await.unwrap_err();
        match err {
            Error::Api { status, ref body } => {
                assert_eq!(status, 401);
                assert!(body.contains("API key"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert!(err.is_configuration());
        assert!(!backend.health_check().await);
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockOpenAIServer::start(MockReply::Status(503, "overloaded".into())).await;
        let backend = OpenAIBackend::with_api_key(&server.url(), "gpt-4o", "sk-test");

        let err = backend.complete_json(&request()).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_data() {
        let server = MockOpenAIServer::start(MockReply::EmptyChoices).await;
        let backend = OpenAIBackend::with_api_key(&server.url(), "gpt-4o", "sk-test");

        let err = backend.complete_json(&request()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockOpenAIServer::start(MockReply::Content("{}".into())).await;
        let backend = OpenAIBackend::with_api_key(&server.url(), "gpt-4o", "sk-test");
        assert!(backend.health_check().await);

        let unreachable = OpenAIBackend::with_api_key("http://localhost:1", "gpt-4o", "sk-test");
        assert!(!unreachable.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check_gives_up_on_silent_host() {
        // Accepts connections and never writes a byte back
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let backend = OpenAIBackend::with_api_key(&format!("http://{}", addr), "gpt-4o", "sk-test");
        let started = std::time::Instant::now();
        let healthy = tokio::time::timeout(
            HEALTH_CHECK_TIMEOUT + Duration::from_secs(3),
            backend.health_check(),
        )
        .await
        .expect("health check should be bounded");

        assert!(!healthy);
        assert!(started.elapsed() >= HEALTH_CHECK_TIMEOUT);
    }
}
