//! Claimdesk Core Library
//!
//! Shared functionality for the Claimdesk claims dashboard:
//! - Claim, task and activity models
//! - Pluggable AI backends (OpenAI chat completions, mock)
//! - Prompt library for customizable AI prompts
//! - Insights generator with deterministic fallbacks

pub mod ai;
pub mod error;
pub mod insights;
pub mod models;
pub mod prompts;

/// Test utilities including mock OpenAI server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, BackendInfo, CompletionRequest, MockBackend, OpenAIBackend};
pub use error::{Error, Result};
pub use insights::{
    AnalysisResult, ImpactArea, Insight, InsightCategory, InsightsGenerator, OutcomePrediction,
    Priority, Recommendation,
};
pub use models::{ActivitySummary, ActivityType, ClaimStatus, ClaimSummary, NewClaim, TaskSummary};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
