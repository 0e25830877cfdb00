//! Prompt context for the claim analysis calls
//!
//! Records are projected to compact serializable forms before they are
//! embedded in a prompt: descriptions and other free text stay out, the
//! fields that drive processing-time and status analysis stay in.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::{
    ActivitySummary, ActivityType, ClaimStatus, ClaimSummary, NewClaim, TaskSummary,
};

/// Claim fields sent to the model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimProjection {
    pub id: i64,
    pub claim_number: String,
    pub status: ClaimStatus,
    pub date_submitted: DateTime<Utc>,
    pub date_completed: Option<DateTime<Utc>>,
    pub amount: f64,
    pub missing_information: bool,
}

impl From<&ClaimSummary> for ClaimProjection {
    fn from(c: &ClaimSummary) -> Self {
        Self {
            id: c.id,
            claim_number: c.claim_number.clone(),
            status: c.status,
            date_submitted: c.date_submitted,
            date_completed: c.date_completed,
            amount: c.amount,
            missing_information: c.is_missing_information(),
        }
    }
}

/// Task fields sent to the model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProjection {
    pub id: i64,
    pub claim_id: Option<i64>,
    pub title: String,
    pub status: String,
    pub due_date: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&TaskSummary> for TaskProjection {
    fn from(t: &TaskSummary) -> Self {
        Self {
            id: t.id,
            claim_id: t.claim_id,
            title: t.title.clone(),
            status: t.status.clone(),
            due_date: t.due_date,
            completed_at: t.completed_at,
        }
    }
}

/// Activity fields sent to the model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityProjection {
    pub id: i64,
    pub claim_id: i64,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub timestamp: DateTime<Utc>,
}

impl From<&ActivitySummary> for ActivityProjection {
    fn from(a: &ActivitySummary) -> Self {
        Self {
            id: a.id,
            claim_id: a.claim_id,
            activity_type: a.activity_type,
            timestamp: a.timestamp,
        }
    }
}

/// Aggregates over a set of claims, given to the model as a hint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub missing_information: usize,
    pub total_amount: f64,
    /// Mean submission-to-completion time over completed claims
    pub average_processing_days: Option<f64>,
}

impl ClaimStats {
    pub fn from_claims(claims: &[ClaimSummary]) -> Self {
        let mut by_status = BTreeMap::new();
        let mut missing_information = 0;
        let mut total_amount = 0.0;
        let mut processing_days = Vec::new();

        for claim in claims {
            *by_status.entry(claim.status.as_str()).or_insert(0) += 1;
            if claim.is_missing_information() {
                missing_information += 1;
            }
            total_amount += claim.amount;
            if let Some(days) = claim.processing_days() {
                processing_days.push(days as f64);
            }
        }

        let average_processing_days = if processing_days.is_empty() {
            None
        } else {
            Some(processing_days.iter().sum::<f64>() / processing_days.len() as f64)
        };

        Self {
            total: claims.len(),
            by_status,
            missing_information,
            total_amount,
            average_processing_days,
        }
    }

    /// Plain-text rendering for the prompt
    pub fn to_prompt_text(&self) -> String {
        let mut lines = vec![format!("total_claims: {}", self.total)];
        for (status, count) in &self.by_status {
            lines.push(format!("status_{}: {}", status, count));
        }
        lines.push(format!("missing_information: {}", self.missing_information));
        lines.push(format!("total_amount: {:.2}", self.total_amount));
        if let Some(avg) = self.average_processing_days {
            lines.push(format!("average_processing_days: {:.1}", avg));
        }
        lines.join("\n")
    }
}

/// Everything the insights prompt needs
#[derive(Debug, Clone)]
pub struct InsightsContext {
    pub claims: Vec<ClaimProjection>,
    pub tasks: Vec<TaskProjection>,
    pub activities: Vec<ActivityProjection>,
    /// None when there are no claims
    pub stats: Option<ClaimStats>,
}

impl InsightsContext {
    pub fn from_records(
        claims: &[ClaimSummary],
        tasks: &[TaskSummary],
        activities: &[ActivitySummary],
    ) -> Self {
        Self {
            claims: claims.iter().map(ClaimProjection::from).collect(),
            tasks: tasks.iter().map(TaskProjection::from).collect(),
            activities: activities.iter().map(ActivityProjection::from).collect(),
            stats: (!claims.is_empty()).then(|| ClaimStats::from_claims(claims)),
        }
    }

    pub fn to_template_vars(&self) -> Result<HashMap<&'static str, String>> {
        let mut vars = HashMap::new();
        vars.insert("claims", serde_json::to_string_pretty(&self.claims)?);
        vars.insert("tasks", serde_json::to_string_pretty(&self.tasks)?);
        vars.insert("activities", serde_json::to_string_pretty(&self.activities)?);
        if let Some(ref stats) = self.stats {
            vars.insert("stats", stats.to_prompt_text());
        }
        Ok(vars)
    }
}

/// Everything the outcome prompt needs
#[derive(Debug, Clone)]
pub struct PredictionContext<'a> {
    pub historical_claims: Vec<ClaimProjection>,
    pub new_claim: &'a NewClaim,
    pub stats: Option<ClaimStats>,
}

impl<'a> PredictionContext<'a> {
    pub fn from_records(history: &[ClaimSummary], new_claim: &'a NewClaim) -> Self {
        Self {
            historical_claims: history.iter().map(ClaimProjection::from).collect(),
            new_claim,
            stats: (!history.is_empty()).then(|| ClaimStats::from_claims(history)),
        }
    }

    pub fn to_template_vars(&self) -> Result<HashMap<&'static str, String>> {
        let mut vars = HashMap::new();
        vars.insert(
            "historical_claims",
            serde_json::to_string_pretty(&self.historical_claims)?,
        );
        vars.insert("new_claim", serde_json::to_string_pretty(self.new_claim)?);
        if let Some(ref stats) = self.stats {
            vars.insert("stats", stats.to_prompt_text());
        }
        Ok(vars)
    }
}
