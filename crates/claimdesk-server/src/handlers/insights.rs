//! AI insights handlers
//!
//! Both analysis endpoints answer 200 even when the model is unavailable: the
//! generator returns its fallback payload with the diagnostic in `error`, and
//! the dashboard renders that as-is.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{AppError, AppState};
use claimdesk_core::{
    ActivitySummary, AnalysisResult, ClaimSummary, OutcomePrediction, PromptInfo, TaskSummary,
};

/// Request body for insights generation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    #[serde(default)]
    pub claims: Vec<ClaimSummary>,
    #[serde(default)]
    pub tasks: Vec<TaskSummary>,
    #[serde(default)]
    pub activities: Vec<ActivitySummary>,
}

/// POST /api/ai/insights - Generate insights and recommendations
pub async fn generate_insights(
    State(state): State<Arc<AppState>>,
    Json(body): Json<InsightsRequest>,
) -> Json<AnalysisResult> {
    let result = state
        .generator
        .generate_claim_insights(&body.claims, &body.tasks, &body.activities)
        .await;
    Json(result)
}

/// Request body for outcome prediction
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    #[serde(default)]
    pub historical_claims: Vec<ClaimSummary>,
    /// Free-form description of the claim being evaluated
    #[serde(default)]
    pub new_claim: Option<Value>,
}

/// POST /api/ai/predict - Predict the outcome of a new claim
pub async fn predict_outcome(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PredictRequest>,
) -> Result<Json<OutcomePrediction>, AppError> {
    let Some(Value::Object(new_claim)) = body.new_claim else {
        return Err(AppError::bad_request("newClaim must be a JSON object"));
    };
    debug!(fields = new_claim.len(), "Predicting outcome for new claim");

    let prediction = state
        .generator
        .predict_claim_outcome(&body.historical_claims, &new_claim)
        .await;
    Ok(Json(prediction))
}

/// GET /api/ai/prompts - List prompts in use and whether they are overridden
pub async fn list_prompts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PromptInfo>>, AppError> {
    Ok(Json(state.generator.prompt_info()?))
}
