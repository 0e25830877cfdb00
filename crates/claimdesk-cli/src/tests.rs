//! CLI command tests

use std::io::Write;

use claimdesk_core::{AIClient, InsightsGenerator, MockBackend, PromptId, PromptLibrary};

use crate::cli::OutputFormat;
use crate::commands::{self, InsightsInput};

fn mock_generator(mock: MockBackend) -> InsightsGenerator {
    InsightsGenerator::new(AIClient::Mock(mock)).with_prompts(PromptLibrary::embedded_only())
}

fn write_json(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

const SNAPSHOT: &str = r#"{
  "claims": [
    {"id": 1, "claimNumber": "CLM-1", "status": "completed", "dateSubmitted": "2024-03-01T00:00:00Z", "dateCompleted": "2024-03-09T00:00:00Z", "amount": 820},
    {"id": 2, "claimNumber": "CLM-2", "status": "missing_info", "dateSubmitted": "2024-03-05T00:00:00Z", "amount": "$1,250.50"}
  ],
  "tasks": [
    {"id": 10, "claimId": 2, "title": "Request BOL", "status": "pending", "dueDate": "2024-03-12T00:00:00Z"}
  ]
}"#;

// ========== Input loading ==========

#[test]
fn test_load_insights_input_defaults_missing_lists() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(&dir, "snapshot.json", SNAPSHOT);

    let input = commands::load_insights_input(&path).unwrap();
    assert_eq!(input.claims.len(), 2);
    assert_eq!(input.tasks.len(), 1);
    assert!(input.activities.is_empty());
    assert_eq!(input.claims[1].amount, 1250.50);
}

#[test]
fn test_load_insights_input_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = commands::load_insights_input(&dir.path().join("nope.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}

#[test]
fn test_load_new_claim_requires_object() {
    let dir = tempfile::tempdir().unwrap();

    let ok = write_json(&dir, "claim.json", r#"{"claimType": "damage", "amount": 400}"#);
    let claim = commands::load_new_claim(&ok).unwrap();
    assert_eq!(claim["claimType"], "damage");

    let bad = write_json(&dir, "array.json", "[1, 2, 3]");
    let err = commands::load_new_claim(&bad).unwrap_err();
    assert!(err.to_string().contains("must be a JSON object"));
}

#[test]
fn test_load_history_rejects_object() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(&dir, "history.json", r#"{"claims": []}"#);
    let err = commands::load_history(&path).unwrap_err();
    assert!(err.to_string().contains("JSON array of claims"));
}

// ========== Insights / Predict ==========

#[tokio::test]
async fn test_run_insights_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(&dir, "snapshot.json", SNAPSHOT);
    let input = commands::load_insights_input(&path).unwrap();

    let out = commands::run_insights(&mock_generator(MockBackend::new()), &input, OutputFormat::Json)
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["insights"].as_array().unwrap().len(), 3);
    assert!(json["summaryText"].is_string());
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn test_run_insights_text_fallback() {
    let out = commands::run_insights(
        &mock_generator(MockBackend::without_api_key()),
        &InsightsInput::default(),
        OutputFormat::Text,
    )
    .await
    .unwrap();

    assert!(out.contains("AI analysis unavailable"));
    assert!(out.contains("Unable to generate AI insights at this time."));
    assert!(out.contains("[high  ] (process) Check system configuration for AI analysis."));
    assert!(out.contains("Error:"));
}

#[tokio::test]
async fn test_run_predict_text() {
    let dir = tempfile::tempdir().unwrap();
    let claim = write_json(&dir, "claim.json", r#"{"claimType": "shortage"}"#);
    let new_claim = commands::load_new_claim(&claim).unwrap();

    let out = commands::run_predict(
        &mock_generator(MockBackend::new()),
        &[],
        &new_claim,
        OutputFormat::Text,
    )
    .await
    .unwrap();

    assert!(out.starts_with("Likely outcome:"));
    assert!(out.contains("Processing time: ~12 days"));
    assert!(out.contains("Confidence:      70%"));
}

#[tokio::test]
async fn test_run_predict_fallback_json() {
    let out = commands::run_predict(
        &mock_generator(MockBackend::failing("boom")),
        &[],
        &serde_json::Map::new(),
        OutputFormat::Json,
    )
    .await
    .unwrap();

    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["likelyOutcome"], "Unable to predict outcome");
    assert_eq!(json["estimatedProcessingDays"], 14);
}

// ========== Prompts ==========

#[test]
fn test_format_prompt_list() {
    let mut library = PromptLibrary::embedded_only();
    let out = commands::format_prompt_list(&mut library);

    assert!(out.contains("claim_insights"));
    assert!(out.contains("claim_outcome"));
    assert!(out.contains("Default"));
    assert!(out.contains("(not available)"));
}

#[test]
fn test_format_prompt_shows_override() {
    let dir = tempfile::tempdir().unwrap();
    write_json(
        &dir,
        "claim_outcome.md",
        "---\nid: claim_outcome\nversion: 7\ntask_type: prediction\n---\n\n# System\n\nBe brief.\n\n# User\n\n{{new_claim}}\n",
    );
    let mut library = PromptLibrary::with_override_dir(dir.path().to_path_buf());

    let out = commands::format_prompt(&mut library, PromptId::ClaimOutcome).unwrap();
    assert!(out.contains("Version: 7"));
    assert!(out.contains("Source: Override"));
    assert!(out.contains("Be brief."));

    let list = commands::format_prompt_list(&mut library);
    assert!(list.contains("✓ Custom"));
}

#[test]
fn test_cmd_prompts_show_unknown_id() {
    let mut library = PromptLibrary::embedded_only();
    assert!(commands::cmd_prompts_show(&mut library, "classify_merchant").is_ok());
}
