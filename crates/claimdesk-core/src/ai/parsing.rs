//! JSON parsing helpers for AI backend responses
//!
//! Models asked for a JSON object still occasionally wrap it in prose or a
//! code fence. These helpers extract the object, deserialize it with
//! field-level defaults, and convert it into the domain result types.

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::insights::types::{
    AnalysisResult, ImpactArea, Insight, InsightCategory, OutcomePrediction, Priority,
    Recommendation, DEFAULT_OUTCOME, DEFAULT_PREDICTION_CONFIDENCE, DEFAULT_PROCESSING_DAYS,
    DEFAULT_SUMMARY,
};

/// How much of a bad reply to keep in error messages
const RAW_PREVIEW_LEN: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysis {
    #[serde(default)]
    insights: Option<Vec<RawInsight>>,
    #[serde(default)]
    recommendations: Option<Vec<RawRecommendation>>,
    #[serde(default)]
    summary_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInsight {
    insight: String,
    #[serde(default)]
    confidence_score: Option<f64>,
    category: InsightCategory,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecommendation {
    recommendation: String,
    priority: Priority,
    impact_area: ImpactArea,
    #[serde(default)]
    estimated_impact: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrediction {
    #[serde(default)]
    likely_outcome: Option<String>,
    #[serde(default)]
    estimated_processing_days: Option<f64>,
    #[serde(default)]
    confidence_score: Option<f64>,
    #[serde(default)]
    potential_issues: Option<Vec<String>>,
    #[serde(default)]
    recommended_actions: Option<Vec<String>>,
}

/// Cut `s` to at most `max` bytes on a char boundary
fn preview(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &s[..cut])
}

/// Find the outermost `{...}` in a model reply
pub fn extract_json_object(response: &str) -> Result<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::InvalidData(format!(
            "No JSON found in AI response | Raw: {}",
            preview(response, RAW_PREVIEW_LEN)
        ))),
    }
}

fn deserialize_reply<'a, T: Deserialize<'a>>(response: &'a str, what: &str) -> Result<T> {
    let json_str = extract_json_object(response)?;
    serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid {} JSON from AI: {} | Raw: {}",
            what,
            e,
            preview(json_str, RAW_PREVIEW_LEN)
        ))
    })
}

/// Clamp a model-supplied confidence into [0, 1]
fn clamp_confidence(value: f64, field: &str) -> f64 {
    if (0.0..=1.0).contains(&value) {
        value
    } else {
        warn!(field, value, "Confidence score out of range, clamping");
        value.clamp(0.0, 1.0)
    }
}

/// Parse the reply to the claim insights prompt
///
/// `processing_time_ms` is filled in by the caller once parsing is done.
pub fn parse_analysis_response(response: &str) -> Result<AnalysisResult> {
    let raw: RawAnalysis = deserialize_reply(response, "insights")?;

    let insights = raw
        .insights
        .unwrap_or_default()
        .into_iter()
        .map(|i| Insight {
            insight: i.insight,
            confidence_score: clamp_confidence(
                i.confidence_score.unwrap_or(DEFAULT_PREDICTION_CONFIDENCE),
                "insights.confidenceScore",
            ),
            category: i.category,
        })
        .collect();

    let recommendations = raw
        .recommendations
        .unwrap_or_default()
        .into_iter()
        .map(|r| Recommendation {
            recommendation: r.recommendation,
            priority: r.priority,
            impact_area: r.impact_area,
            estimated_impact: r.estimated_impact.unwrap_or_default(),
        })
        .collect();

    let summary_text = raw
        .summary_text
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

    Ok(AnalysisResult {
        insights,
        recommendations,
        summary_text,
        processing_time_ms: 0,
        error: None,
    })
}

/// Parse the reply to the claim outcome prompt
pub fn parse_prediction_response(response: &str) -> Result<OutcomePrediction> {
    let raw: RawPrediction = deserialize_reply(response, "prediction")?;

    let estimated_processing_days = match raw.estimated_processing_days {
        Some(days) if days.is_finite() => days.round().clamp(0.0, u32::MAX as f64) as u32,
        _ => DEFAULT_PROCESSING_DAYS,
    };

    let likely_outcome = raw
        .likely_outcome
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_OUTCOME.to_string());

    Ok(OutcomePrediction {
        likely_outcome,
        estimated_processing_days,
        confidence_score: clamp_confidence(
            raw.confidence_score.unwrap_or(DEFAULT_PREDICTION_CONFIDENCE),
            "confidenceScore",
        ),
        potential_issues: raw.potential_issues.unwrap_or_default(),
        recommended_actions: raw.recommended_actions.unwrap_or_default(),
        error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_with_prose() {
        let reply = "Sure! Here you go:\n```json\n{\"a\": {\"b\": 1}}\n```\nLet me know.";
        assert_eq!(extract_json_object(reply).unwrap(), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn test_extract_json_object_missing() {
        let err = extract_json_object("I cannot help with that.").unwrap_err();
        assert!(err.to_string().contains("No JSON found"));
        assert!(extract_json_object("} backwards {").is_err());
    }

    #[test]
    fn test_parse_analysis_full() {
        let reply = r#"{
            "insights": [
                {"insight": "Backlog is growing", "confidenceScore": 0.8, "category": "trend"}
            ],
            "recommendations": [
                {"recommendation": "Add a reviewer", "priority": "medium", "impactArea": "resource", "estimatedImpact": "Shorter queue"}
            ],
            "summaryText": "Queue needs attention."
        }"#;

        let result = parse_analysis_response(reply).unwrap();
        assert_eq!(result.insights.len(), 1);
        assert_eq!(result.insights[0].category, InsightCategory::Trend);
        assert_eq!(result.recommendations[0].impact_area, ImpactArea::Resource);
        assert_eq!(result.summary_text, "Queue needs attention.");
        assert!(result.error.is_none());
    }

    #[test]
    fn test_parse_analysis_missing_fields_use_defaults() {
        let result = parse_analysis_response("{}").unwrap();
        assert!(result.insights.is_empty());
        assert!(result.recommendations.is_empty());
        assert_eq!(result.summary_text, DEFAULT_SUMMARY);

        let result =
            parse_analysis_response(r#"{"insights": null, "summaryText": "   "}"#).unwrap();
        assert!(result.insights.is_empty());
        assert_eq!(result.summary_text, DEFAULT_SUMMARY);
    }

    #[test]
    fn test_parse_analysis_clamps_confidence() {
        let reply = r#"{"insights": [
            {"insight": "a", "confidenceScore": 1.7, "category": "risk"},
            {"insight": "b", "confidenceScore": -0.2, "category": "risk"},
            {"insight": "c", "category": "risk"}
        ]}"#;
        let result = parse_analysis_response(reply).unwrap();
        assert_eq!(result.insights[0].confidence_score, 1.0);
        assert_eq!(result.insights[1].confidence_score, 0.0);
        assert_eq!(result.insights[2].confidence_score, 0.5);
    }

    #[test]
    fn test_parse_analysis_rejects_unknown_enum() {
        let reply = r#"{"insights": [{"insight": "x", "confidenceScore": 0.5, "category": "gossip"}]}"#;
        let err = parse_analysis_response(reply).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_parse_analysis_rejects_wrong_type() {
        assert!(parse_analysis_response(r#"{"insights": "none"}"#).is_err());
        assert!(parse_analysis_response(r#"{"summaryText": 5}"#).is_err());
    }

    #[test]
    fn test_parse_prediction_defaults() {
        let prediction = parse_prediction_response("{}").unwrap();
        assert_eq!(prediction.likely_outcome, DEFAULT_OUTCOME);
        assert_eq!(prediction.estimated_processing_days, 14);
        assert_eq!(prediction.confidence_score, 0.5);
        assert!(prediction.potential_issues.is_empty());
        assert!(prediction.recommended_actions.is_empty());
    }

    #[test]
    fn test_parse_prediction_normalizes_days_and_confidence() {
        let reply = r#"{"likelyOutcome": "Approved", "estimatedProcessingDays": 9.6, "confidenceScore": 3}"#;
        let prediction = parse_prediction_response(reply).unwrap();
        assert_eq!(prediction.estimated_processing_days, 10);
        assert_eq!(prediction.confidence_score, 1.0);

        let prediction =
            parse_prediction_response(r#"{"estimatedProcessingDays": -4}"#).unwrap();
        assert_eq!(prediction.estimated_processing_days, 0);
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let s = "é".repeat(150);
        let p = preview(&s, 201);
        assert!(p.ends_with("..."));
    }
}
