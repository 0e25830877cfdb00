//! Liveness and AI backend status handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use claimdesk_core::{AIBackend, BackendInfo};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/health - Liveness probe (no auth)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// AI backend status
#[derive(Debug, Serialize)]
pub struct AiStatusResponse {
    #[serde(flatten)]
    pub backend: BackendInfo,
    /// Whether the backend answered a health check just now
    pub available: bool,
}

/// GET /api/ai/status - Report which AI backend is configured and whether it responds
pub async fn ai_status(State(state): State<Arc<AppState>>) -> Json<AiStatusResponse> {
    let ai = state.generator.ai();
    Json(AiStatusResponse {
        backend: ai.info(),
        available: ai.health_check().await,
    })
}
