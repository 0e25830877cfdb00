//! AI insights for claims processing
//!
//! The generator turns claim, task and activity snapshots into insights,
//! recommendations and a summary, and predicts outcomes for new claims.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use claimdesk_core::insights::InsightsGenerator;
//!
//! let generator = InsightsGenerator::from_env();
//! let result = generator.generate_claim_insights(&claims, &tasks, &activities).await;
//! if result.is_fallback() {
//!     eprintln!("AI unavailable: {:?}", result.error);
//! }
//! ```

pub mod context;
pub mod generator;
pub mod types;

pub use context::{ClaimStats, InsightsContext, PredictionContext};
pub use generator::{InsightsGenerator, DEFAULT_TIMEOUT};
pub use types::{
    AnalysisResult, ImpactArea, Insight, InsightCategory, OutcomePrediction, Priority,
    Recommendation,
};
