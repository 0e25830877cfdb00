//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `insights` - Insights and outcome prediction from JSON files
//! - `prompts` - Prompt library management commands
//! - `serve` - Web server command
//! - `status` - AI backend status

pub mod insights;
pub mod prompts;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use insights::*;
pub use prompts::*;
pub use serve::*;
pub use status::*;
