//! Pluggable AI backend abstraction
//!
//! This module provides a backend-agnostic interface for the chat-completion
//! calls the insights generator makes.
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all AI operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAIBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ai = AIClient::from_env();
//! let request = CompletionRequest::json("You are...", "Analyze...");
//! let raw = ai.complete_json(&request).await?;
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai, mock). Default: openai
//! - `OPENAI_API_KEY`: API key (calls fail with a configuration error when absent)
//! - `OPENAI_BASE_URL`: Server URL (default: https://api.openai.com)
//! - `OPENAI_MODEL`: Model name (default: gpt-4o)

mod mock;
mod openai;
pub mod parsing;
pub mod types;

pub use mock::MockBackend;
pub use openai::OpenAIBackend;
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Run one chat completion and return the raw text of the first choice
    async fn complete_json(&self, request: &CompletionRequest) -> Result<String>;

    /// Check if the backend is reachable and accepts our credentials
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;

    /// Whether a credential is configured
    fn has_credentials(&self) -> bool;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI chat completions API (or any compatible server)
    OpenAI(OpenAIBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `openai` (default): Uses OPENAI_API_KEY, OPENAI_BASE_URL and OPENAI_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// An OpenAI client is returned even without a key so that callers get
    /// the "API key" diagnostic through the normal fallback path.
    pub fn from_env() -> Self {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai".to_string());

        match backend.to_lowercase().as_str() {
            "openai" | "openai_compatible" => AIClient::OpenAI(OpenAIBackend::from_env()),
            "mock" => AIClient::Mock(MockBackend::new()),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to openai");
                AIClient::OpenAI(OpenAIBackend::from_env())
            }
        }
    }

    /// Create an OpenAI backend directly
    pub fn openai(base_url: &str, model: &str, api_key: Option<&str>) -> Self {
        let backend = match api_key {
            Some(key) => OpenAIBackend::with_api_key(base_url, model, key),
            None => OpenAIBackend::new(base_url, model),
        };
        AIClient::OpenAI(backend)
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::OpenAI(b) => AIClient::OpenAI(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.with_model(model)),
        }
    }

    /// Short backend name
    pub fn kind(&self) -> &'static str {
        match self {
            AIClient::OpenAI(_) => "openai",
            AIClient::Mock(_) => "mock",
        }
    }

    /// Describe the backend for status output
    pub fn info(&self) -> BackendInfo {
        BackendInfo {
            backend: self.kind().to_string(),
            model: self.model().to_string(),
            host: self.host().to_string(),
            configured: self.has_credentials(),
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn complete_json(&self, request: &CompletionRequest) -> Result<String> {
        match self {
            AIClient::OpenAI(b) => b.complete_json(request).await,
            AIClient::Mock(b) => b.complete_json(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAI(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAI(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAI(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }

    fn has_credentials(&self) -> bool {
        match self {
            AIClient::OpenAI(b) => b.has_credentials(),
            AIClient::Mock(b) => b.has_credentials(),
        }
    }
}
