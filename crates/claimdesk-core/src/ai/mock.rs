//! Mock backend for testing
//!
//! Returns well-formed canned replies for both claim prompts, or a configured
//! fixed reply, failure or delay. Useful for unit tests and for running the
//! server without an OpenAI key (`AI_BACKEND=mock`).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::CompletionRequest;
use super::AIBackend;

const MOCK_MODEL: &str = "mock";
const MOCK_HOST: &str = "mock://localhost";

const CANNED_INSIGHTS: &str = r#"{
  "insights": [
    {"insight": "Claims flagged for missing information take roughly twice as long to close.", "confidenceScore": 0.82, "category": "efficiency"},
    {"insight": "Several high-value claims have had no logged activity in the past week.", "confidenceScore": 0.74, "category": "risk"},
    {"insight": "Phone follow-ups precede most status changes to completed.", "confidenceScore": 0.61, "category": "trend"}
  ],
  "recommendations": [
    {"recommendation": "Send a document checklist with every new claim acknowledgement.", "priority": "high", "impactArea": "documentation", "estimatedImpact": "Fewer claims stalled in missing_info"},
    {"recommendation": "Schedule a weekly review of claims idle for more than five days.", "priority": "medium", "impactArea": "process", "estimatedImpact": "Earlier detection of stuck claims"},
    {"recommendation": "Prefer phone follow-ups for claims awaiting carrier response.", "priority": "low", "impactArea": "communication", "estimatedImpact": "Faster carrier turnaround"}
  ],
  "summaryText": "Processing is steady; missing documentation is the main source of delay."
}"#;

const CANNED_PREDICTION: &str = r#"{
  "likelyOutcome": "Likely approved after document review",
  "estimatedProcessingDays": 12,
  "confidenceScore": 0.7,
  "potentialIssues": ["Proof of delivery may be requested"],
  "recommendedActions": ["Attach the bill of lading and delivery receipt up front"]
}"#;

/// Mock AI backend for testing
///
/// Returns predictable responses. Clones share the call counter and the
/// last-request slot so a test can inspect a backend after handing it to a
/// generator.
#[derive(Clone)]
pub struct MockBackend {
    healthy: bool,
    model: String,
    response: Option<String>,
    failure: Option<String>,
    delay: Option<Duration>,
    has_key: bool,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<CompletionRequest>>>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            model: MOCK_MODEL.to_string(),
            response: None,
            failure: None,
            delay: None,
            has_key: true,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Always reply with this exact text
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            ..Self::new()
        }
    }

    /// Always fail with `Error::InvalidData(message)`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            healthy: false,
            ..Self::new()
        }
    }

    /// Behave like an unconfigured OpenAI backend
    pub fn without_api_key() -> Self {
        Self {
            has_key: false,
            healthy: false,
            ..Self::new()
        }
    }

    /// Sleep before replying
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Create a new instance with a different model name
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// Number of completed or attempted calls
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request received
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn complete_json(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if !self.has_key {
            return Err(Error::MissingApiKey);
        }
        if let Some(ref message) = self.failure {
            return Err(Error::InvalidData(message.clone()));
        }
        if let Some(ref response) = self.response {
            return Ok(response.clone());
        }

        // The outcome prompt is the only one asking for a processing estimate
        if request.user.contains("estimatedProcessingDays") {
            Ok(CANNED_PREDICTION.to_string())
        } else {
            Ok(CANNED_INSIGHTS.to_string())
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        MOCK_HOST
    }

    fn has_credentials(&self) -> bool {
        self.has_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_reply_depends_on_prompt() {
        let mock = MockBackend::new();

        let insights = mock
            .complete_json(&CompletionRequest::json("sys", "Analyze these claims"))
            .await
            .unwrap();
        assert!(insights.contains("summaryText"));

        let prediction = mock
            .complete_json(&CompletionRequest::json(
                "sys",
                "Return likelyOutcome and estimatedProcessingDays",
            ))
            .await
            .unwrap();
        assert!(prediction.contains("likelyOutcome"));
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let mock = MockBackend::with_response("{}");
        let clone = mock.clone();

        clone
            .complete_json(&CompletionRequest::json("system text", "user text"))
            .await
            .unwrap();

        assert_eq!(mock.calls(), 1);
        let last = mock.last_request().unwrap();
        assert_eq!(last.system, "system text");
        assert!(last.json_mode);
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let err = MockBackend::without_api_key()
            .complete_json(&CompletionRequest::json("s", "u"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));

        let err = MockBackend::failing("boom")
            .complete_json(&CompletionRequest::json("s", "u"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_with_model_keeps_behaviour() {
        let mock = MockBackend::without_api_key().with_model("gpt-test");
        assert_eq!(mock.model(), "gpt-test");
        assert_eq!(mock.host(), MOCK_HOST);
        assert!(!mock.healthy);
        assert!(!mock.has_credentials());
    }
}
