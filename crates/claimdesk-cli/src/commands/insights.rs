//! Insights and prediction command implementations

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::cli::OutputFormat;
use claimdesk_core::{
    ActivitySummary, AnalysisResult, ClaimSummary, InsightsGenerator, NewClaim, OutcomePrediction,
    TaskSummary,
};

/// Dashboard snapshot read by `claimdesk insights`
#[derive(Debug, Default, Deserialize)]
pub struct InsightsInput {
    #[serde(default)]
    pub claims: Vec<ClaimSummary>,
    #[serde(default)]
    pub tasks: Vec<TaskSummary>,
    #[serde(default)]
    pub activities: Vec<ActivitySummary>,
}

pub async fn cmd_insights(
    generator: &InsightsGenerator,
    input: &Path,
    format: OutputFormat,
) -> Result<()> {
    let snapshot = load_insights_input(input)?;
    println!("{}", run_insights(generator, &snapshot, format).await?);
    Ok(())
}

pub async fn cmd_predict(
    generator: &InsightsGenerator,
    history: Option<&Path>,
    claim: &Path,
    format: OutputFormat,
) -> Result<()> {
    let historical = match history {
        Some(path) => load_history(path)?,
        None => Vec::new(),
    };
    let new_claim = load_new_claim(claim)?;
    println!("{}", run_predict(generator, &historical, &new_claim, format).await?);
    Ok(())
}

/// Generate insights and render them in the requested format
pub async fn run_insights(
    generator: &InsightsGenerator,
    snapshot: &InsightsInput,
    format: OutputFormat,
) -> Result<String> {
    let result = generator
        .generate_claim_insights(&snapshot.claims, &snapshot.tasks, &snapshot.activities)
        .await;
    if let Some(ref err) = result.error {
        tracing::warn!("AI insights unavailable, showing fallback: {}", err);
    }

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => Ok(format_analysis_text(&result)),
    }
}

/// Predict an outcome and render it in the requested format
pub async fn run_predict(
    generator: &InsightsGenerator,
    historical: &[ClaimSummary],
    new_claim: &NewClaim,
    format: OutputFormat,
) -> Result<String> {
    let prediction = generator.predict_claim_outcome(historical, new_claim).await;
    if let Some(ref err) = prediction.error {
        tracing::warn!("Outcome prediction unavailable, showing fallback: {}", err);
    }

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&prediction)?),
        OutputFormat::Text => Ok(format_prediction_text(&prediction)),
    }
}

pub fn load_insights_input(path: &Path) -> Result<InsightsInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid insights input in {}", path.display()))
}

pub fn load_history(path: &Path) -> Result<Vec<ClaimSummary>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Expected a JSON array of claims in {}", path.display()))
}

pub fn load_new_claim(path: &Path) -> Result<NewClaim> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => bail!("New claim in {} must be a JSON object", path.display()),
    }
}

pub fn format_analysis_text(result: &AnalysisResult) -> String {
    let mut out = String::new();

    if result.is_fallback() {
        out.push_str("⚠️  AI analysis unavailable\n\n");
    }

    out.push_str(&format!("Summary:\n  {}\n\n", result.summary_text));

    out.push_str("Insights:\n");
    for insight in &result.insights {
        out.push_str(&format!(
            "  [{:<10}] {:>3.0}%  {}\n",
            insight.category.as_str(),
            insight.confidence_score * 100.0,
            insight.insight
        ));
    }

    out.push_str("\nRecommendations:\n");
    for rec in &result.recommendations {
        out.push_str(&format!(
            "  [{:<6}] ({}) {}\n",
            rec.priority.as_str(),
            rec.impact_area.as_str(),
            rec.recommendation
        ));
        if !rec.estimated_impact.is_empty() {
            out.push_str(&format!("           → {}\n", rec.estimated_impact));
        }
    }

    out.push_str(&format!("\nProcessed in {}ms", result.processing_time_ms));
    if let Some(ref err) = result.error {
        out.push_str(&format!("\nError: {}", err));
    }
    out
}

pub fn format_prediction_text(prediction: &OutcomePrediction) -> String {
    let mut out = String::new();

    out.push_str(&format!("Likely outcome:  {}\n", prediction.likely_outcome));
    out.push_str(&format!(
        "Processing time: ~{} days\n",
        prediction.estimated_processing_days
    ));
    out.push_str(&format!(
        "Confidence:      {:.0}%\n",
        prediction.confidence_score * 100.0
    ));

    if !prediction.potential_issues.is_empty() {
        out.push_str("\nPotential issues:\n");
        for issue in &prediction.potential_issues {
            out.push_str(&format!("  - {}\n", issue));
        }
    }
    if !prediction.recommended_actions.is_empty() {
        out.push_str("\nRecommended actions:\n");
        for action in &prediction.recommended_actions {
            out.push_str(&format!("  - {}\n", action));
        }
    }
    if let Some(ref err) = prediction.error {
        out.push_str(&format!("\nError: {}\n", err));
    }
    out.trim_end().to_string()
}
