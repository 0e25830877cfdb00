//! Insights generator - claim analysis and outcome prediction
//!
//! Both operations are total: every failure on the model call path (missing
//! key, transport error, non-2xx, malformed reply, deadline) is logged and
//! folded into the fixed fallback result, with the diagnostic kept in the
//! result's `error` field.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::ai::parsing::{parse_analysis_response, parse_prediction_response};
use crate::ai::{AIBackend, AIClient, CompletionRequest};
use crate::error::{Error, Result};
use crate::models::{ActivitySummary, ClaimSummary, NewClaim, TaskSummary};
use crate::prompts::{PromptId, PromptInfo, PromptLibrary};

use super::context::{InsightsContext, PredictionContext};
use super::types::{AnalysisResult, OutcomePrediction};

/// Deadline for one model call unless configured otherwise
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable overriding the call deadline (whole seconds)
pub const TIMEOUT_ENV_VAR: &str = "CLAIMDESK_AI_TIMEOUT_SECS";

/// Generates claim insights and outcome predictions through an AI backend
///
/// Cheap to clone; clones share the prompt cache and the HTTP connection pool.
#[derive(Clone)]
pub struct InsightsGenerator {
    ai: AIClient,
    timeout: Duration,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl InsightsGenerator {
    /// Create a generator with the default deadline and the embedded prompts only
    ///
    /// Nothing is read from disk; use [`with_prompts`](Self::with_prompts) to
    /// enable override files.
    pub fn new(ai: AIClient) -> Self {
        Self {
            ai,
            timeout: DEFAULT_TIMEOUT,
            prompts: Arc::new(RwLock::new(PromptLibrary::embedded_only())),
        }
    }

    /// Create from environment variables (`AI_BACKEND`, `OPENAI_*`, `CLAIMDESK_AI_TIMEOUT_SECS`)
    ///
    /// Prompt overrides are loaded from the user's data directory when present.
    pub fn from_env() -> Self {
        let timeout = timeout_from_env(std::env::var(TIMEOUT_ENV_VAR).ok().as_deref());
        Self::new(AIClient::from_env())
            .with_timeout(timeout)
            .with_prompts(PromptLibrary::new())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    pub fn ai(&self) -> &AIClient {
        &self.ai
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Drop cached prompts so edited override files are picked up
    pub fn reload_prompts(&self) -> Result<()> {
        self.prompts.write().map_err(|_| lock_poisoned())?.clear_cache();
        Ok(())
    }

    /// Prompts in use, with their override status
    pub fn prompt_info(&self) -> Result<Vec<PromptInfo>> {
        Ok(self.prompts.write().map_err(|_| lock_poisoned())?.list())
    }

    /// Analyze claims, tasks and activities into insights and recommendations
    ///
    /// Never fails; see the module docs for the fallback behaviour.
    pub async fn generate_claim_insights(
        &self,
        claims: &[ClaimSummary],
        tasks: &[TaskSummary],
        activities: &[ActivitySummary],
    ) -> AnalysisResult {
        self.generate_claim_insights_within(claims, tasks, activities, self.timeout)
            .await
    }

    /// Same as [`generate_claim_insights`](Self::generate_claim_insights) with a per-call deadline
    pub async fn generate_claim_insights_within(
        &self,
        claims: &[ClaimSummary],
        tasks: &[TaskSummary],
        activities: &[ActivitySummary],
        deadline: Duration,
    ) -> AnalysisResult {
        let start = Instant::now();
        info!(
            claims = claims.len(),
            tasks = tasks.len(),
            activities = activities.len(),
            model = %self.ai.model(),
            "Generating claim insights"
        );

        match self
            .try_generate_insights(claims, tasks, activities, deadline)
            .await
        {
            Ok(mut result) => {
                result.processing_time_ms = elapsed_ms(start);
                info!(
                    insights = result.insights.len(),
                    recommendations = result.recommendations.len(),
                    ms = result.processing_time_ms,
                    "Claim insights generated"
                );
                result
            }
            Err(e) => {
                let ms = elapsed_ms(start);
                log_fallback("Claim insights", &e, ms);
                AnalysisResult::fallback(ms, Some(e.to_string()))
            }
        }
    }

    /// Predict how a new claim will be resolved, based on historical claims
    ///
    /// Never fails; see the module docs for the fallback behaviour.
    pub async fn predict_claim_outcome(
        &self,
        history: &[ClaimSummary],
        new_claim: &NewClaim,
    ) -> OutcomePrediction {
        self.predict_claim_outcome_within(history, new_claim, self.timeout)
            .await
    }

    /// Same as [`predict_claim_outcome`](Self::predict_claim_outcome) with a per-call deadline
    pub async fn predict_claim_outcome_within(
        &self,
        history: &[ClaimSummary],
        new_claim: &NewClaim,
        deadline: Duration,
    ) -> OutcomePrediction {
        let start = Instant::now();
        info!(
            history = history.len(),
            model = %self.ai.model(),
            "Predicting claim outcome"
        );

        match self.try_predict_outcome(history, new_claim, deadline).await {
            Ok(prediction) => {
                info!(
                    days = prediction.estimated_processing_days,
                    confidence = prediction.confidence_score,
                    ms = elapsed_ms(start),
                    "Claim outcome predicted"
                );
                prediction
            }
            Err(e) => {
                log_fallback("Claim outcome prediction", &e, elapsed_ms(start));
                OutcomePrediction::fallback(Some(e.to_string()))
            }
        }
    }

    async fn try_generate_insights(
        &self,
        claims: &[ClaimSummary],
        tasks: &[TaskSummary],
        activities: &[ActivitySummary],
        deadline: Duration,
    ) -> Result<AnalysisResult> {
        let vars = InsightsContext::from_records(claims, tasks, activities).to_template_vars()?;
        let request = self.build_request(PromptId::ClaimInsights, &vars)?;
        let raw = self.complete(&request, deadline).await?;
        parse_analysis_response(&raw)
    }

    async fn try_predict_outcome(
        &self,
        history: &[ClaimSummary],
        new_claim: &NewClaim,
        deadline: Duration,
    ) -> Result<OutcomePrediction> {
        let vars = PredictionContext::from_records(history, new_claim).to_template_vars()?;
        let request = self.build_request(PromptId::ClaimOutcome, &vars)?;
        let raw = self.complete(&request, deadline).await?;
        parse_prediction_response(&raw)
    }

    /// Render a prompt into a JSON-mode request. The lock is released before any await.
    fn build_request(
        &self,
        id: PromptId,
        vars: &HashMap<&'static str, String>,
    ) -> Result<CompletionRequest> {
        let mut prompts = self.prompts.write().map_err(|_| lock_poisoned())?;
        let prompt = prompts.get(id)?;
        debug!(
            prompt = id.as_str(),
            version = prompt.metadata.version,
            is_override = prompt.is_override,
            "Rendering prompt"
        );
        Ok(CompletionRequest::json(
            prompt.render_system(vars)?,
            prompt.render_user(vars),
        ))
    }

    async fn complete(&self, request: &CompletionRequest, deadline: Duration) -> Result<String> {
        let raw = tokio::time::timeout(deadline, self.ai.complete_json(request))
            .await
            .map_err(|_| Error::Timeout(deadline))??;
        debug!(response = %raw, "Raw AI response");
        Ok(raw)
    }
}

/// Not-configured and service-down failures read differently in the logs
fn log_fallback(operation: &str, err: &Error, ms: u64) {
    if err.is_configuration() {
        warn!(error = %err, ms, "{} skipped: AI backend not configured, returning fallback", operation);
    } else {
        warn!(error = %err, ms, "{} failed, returning fallback", operation);
    }
}

fn lock_poisoned() -> Error {
    Error::Prompt("prompt library lock poisoned".into())
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Parse the deadline setting; unset, unparsable or zero means the default
fn timeout_from_env(value: Option<&str>) -> Duration {
    match value.map(str::trim) {
        None | Some("") => DEFAULT_TIMEOUT,
        Some(v) => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(value = v, "Invalid {}, using default", TIMEOUT_ENV_VAR);
                DEFAULT_TIMEOUT
            }
        },
    }
}
