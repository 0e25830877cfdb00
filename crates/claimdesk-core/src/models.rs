//! Domain models for Claimdesk
//!
//! These are read-only snapshots of the records the dashboard backend owns.
//! The insights generator receives them per request and never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Claim lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    New,
    MissingInfo,
    InReview,
    FollowUp,
    Completed,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::MissingInfo => "missing_info",
            Self::InReview => "in_review",
            Self::FollowUp => "follow_up",
            Self::Completed => "completed",
        }
    }
}

/// Kind of activity logged against a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Email,
    Phone,
    Document,
    StatusUpdate,
}

/// A claim as seen by the insights generator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSummary {
    pub id: i64,
    /// Human-facing claim number (e.g. "CLM-2024-0042")
    pub claim_number: String,
    pub status: ClaimStatus,
    pub date_submitted: DateTime<Utc>,
    #[serde(default)]
    pub date_completed: Option<DateTime<Utc>>,
    /// Claimed amount; the backend sends decimals either as numbers or strings
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: f64,
    #[serde(default)]
    pub missing_information: bool,
}

impl ClaimSummary {
    /// Missing-information flag, also implied by the `missing_info` status
    pub fn is_missing_information(&self) -> bool {
        self.missing_information || self.status == ClaimStatus::MissingInfo
    }

    /// Days between submission and completion, if completed
    pub fn processing_days(&self) -> Option<i64> {
        self.date_completed
            .map(|done| (done - self.date_submitted).num_days().max(0))
    }
}

/// A follow-up task, optionally tied to a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub id: i64,
    #[serde(default)]
    pub claim_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// An entry in a claim's activity log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub id: i64,
    pub claim_id: i64,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(default)]
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Unvalidated key-value description of a claim being evaluated
pub type NewClaim = serde_json::Map<String, serde_json::Value>;

/// Accept `1250.5` as well as `"1250.50"` for monetary amounts
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Amount::deserialize(deserializer)? {
        Amount::Number(n) => Ok(n),
        Amount::Text(s) => s
            .trim()
            .trim_start_matches('$')
            .replace(',', "")
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid amount '{}': {}", s, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_deserializes_string_amount() {
        let json = r#"{
            "id": 7,
            "claimNumber": "CLM-007",
            "status": "missing_info",
            "dateSubmitted": "2024-03-01T10:00:00Z",
            "amount": "$1,250.50"
        }"#;
        let claim: ClaimSummary = serde_json::from_str(json).unwrap();
        assert_eq!(claim.amount, 1250.50);
        assert!(claim.date_completed.is_none());
        assert!(!claim.missing_information);
        assert!(claim.is_missing_information());
    }

    #[test]
    fn test_claim_rejects_garbage_amount() {
        let json = r#"{
            "id": 1,
            "claimNumber": "CLM-001",
            "status": "new",
            "dateSubmitted": "2024-03-01T10:00:00Z",
            "amount": "lots"
        }"#;
        assert!(serde_json::from_str::<ClaimSummary>(json).is_err());
    }

    #[test]
    fn test_processing_days() {
        let json = r#"{
            "id": 2,
            "claimNumber": "CLM-002",
            "status": "completed",
            "dateSubmitted": "2024-03-01T10:00:00Z",
            "dateCompleted": "2024-03-11T09:00:00Z",
            "amount": 900
        }"#;
        let claim: ClaimSummary = serde_json::from_str(json).unwrap();
        assert_eq!(claim.processing_days(), Some(9));
    }

    #[test]
    fn test_activity_type_field_name() {
        let json = r#"{
            "id": 3,
            "claimId": 2,
            "type": "status_update",
            "description": "Moved to review",
            "timestamp": "2024-03-02T12:00:00Z"
        }"#;
        let activity: ActivitySummary = serde_json::from_str(json).unwrap();
        assert_eq!(activity.activity_type, ActivityType::StatusUpdate);

        let back = serde_json::to_value(&activity).unwrap();
        assert_eq!(back["type"], "status_update");
        assert_eq!(back["claimId"], 2);
    }
}
