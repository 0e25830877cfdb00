//! AI backend request types
//!
//! These types are backend-agnostic and used across all AI implementations.

/// A single chat-completion call: one system instruction, one user message
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction framing the task
    pub system: String,
    /// User message (usually embeds JSON data)
    pub user: String,
    /// Ask the backend to return exactly one JSON object
    pub json_mode: bool,
    /// Sampling temperature (backend default when None)
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    /// A JSON-mode request with a low temperature for repeatable output
    pub fn json(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            json_mode: true,
            temperature: Some(0.2),
        }
    }
}

/// Backend description for status endpoints and logs
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BackendInfo {
    /// Backend kind ("openai", "mock")
    pub backend: String,
    pub model: String,
    pub host: String,
    /// Whether a credential is present
    pub configured: bool,
}
