//! Result types produced by the insights generator

use serde::{Deserialize, Serialize};

/// What an insight is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Efficiency,
    Risk,
    Opportunity,
    Trend,
}

impl InsightCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightCategory::Efficiency => "efficiency",
            InsightCategory::Risk => "risk",
            InsightCategory::Opportunity => "opportunity",
            InsightCategory::Trend => "trend",
        }
    }
}

/// Recommendation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Part of the claims process a recommendation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactArea {
    Process,
    Documentation,
    Communication,
    Resource,
}

impl ImpactArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactArea::Process => "process",
            ImpactArea::Documentation => "documentation",
            ImpactArea::Communication => "communication",
            ImpactArea::Resource => "resource",
        }
    }
}

/// A short analytical statement about claims-processing data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub insight: String,
    /// Always within [0, 1]
    pub confidence_score: f64,
    pub category: InsightCategory,
}

/// An actionable suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommendation: String,
    pub priority: Priority,
    pub impact_area: ImpactArea,
    pub estimated_impact: String,
}

/// Output of `generate_claim_insights`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
    pub summary_text: String,
    pub processing_time_ms: u64,
    /// Diagnostic message when the fallback was returned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub const FALLBACK_INSIGHT: &str = "Unable to generate AI insights at this time.";
pub const FALLBACK_RECOMMENDATION: &str = "Check system configuration for AI analysis.";
pub const FALLBACK_ESTIMATED_IMPACT: &str = "Will enable AI-powered insights";
pub const FALLBACK_SUMMARY: &str =
    "AI analysis service is currently unavailable. Please check your OpenAI API key configuration.";

/// Summary used when the model omits one
pub const DEFAULT_SUMMARY: &str = "Analysis completed.";

impl AnalysisResult {
    /// The fixed result returned whenever the model call path fails
    pub fn fallback(processing_time_ms: u64, error: Option<String>) -> Self {
        Self {
            insights: vec![Insight {
                insight: FALLBACK_INSIGHT.to_string(),
                confidence_score: 0.0,
                category: InsightCategory::Efficiency,
            }],
            recommendations: vec![Recommendation {
                recommendation: FALLBACK_RECOMMENDATION.to_string(),
                priority: Priority::High,
                impact_area: ImpactArea::Process,
                estimated_impact: FALLBACK_ESTIMATED_IMPACT.to_string(),
            }],
            summary_text: FALLBACK_SUMMARY.to_string(),
            processing_time_ms,
            error,
        }
    }

    /// Whether this is the fallback payload rather than model output
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
            || (self.summary_text == FALLBACK_SUMMARY
                && self.insights.len() == 1
                && self.insights[0].insight == FALLBACK_INSIGHT)
    }
}

/// Output of `predict_claim_outcome`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomePrediction {
    pub likely_outcome: String,
    pub estimated_processing_days: u32,
    /// Always within [0, 1]
    pub confidence_score: f64,
    pub potential_issues: Vec<String>,
    pub recommended_actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub const DEFAULT_PROCESSING_DAYS: u32 = 14;
pub const DEFAULT_PREDICTION_CONFIDENCE: f64 = 0.5;
pub const DEFAULT_OUTCOME: &str = "Unknown";
pub const FALLBACK_OUTCOME: &str = "Unable to predict outcome";
pub const FALLBACK_ISSUE: &str = "Prediction service unavailable";
pub const FALLBACK_ACTION: &str = "Ensure all documentation is complete at submission";

impl OutcomePrediction {
    /// The fixed prediction returned whenever the model call path fails
    pub fn fallback(error: Option<String>) -> Self {
        Self {
            likely_outcome: FALLBACK_OUTCOME.to_string(),
            estimated_processing_days: DEFAULT_PROCESSING_DAYS,
            confidence_score: 0.0,
            potential_issues: vec![FALLBACK_ISSUE.to_string()],
            recommended_actions: vec![FALLBACK_ACTION.to_string()],
            error,
        }
    }
}
