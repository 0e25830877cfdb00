//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Claimdesk - AI insights for trucking claims processing
#[derive(Parser)]
#[command(name = "claimdesk")]
#[command(about = "AI insights and outcome predictions for freight claims", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires a Bearer key from CLAIMDESK_API_KEYS.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing the dashboard build to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Generate insights from a JSON file of claims, tasks and activities
    ///
    /// The file holds an object: {"claims": [...], "tasks": [...], "activities": [...]}.
    /// Missing lists are treated as empty.
    Insights {
        /// Input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Predict the outcome of a new claim
    Predict {
        /// JSON file with an array of historical claims
        #[arg(long)]
        history: Option<PathBuf>,

        /// JSON file with the new claim (any JSON object)
        #[arg(long)]
        claim: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Show AI backend configuration and connectivity
    Status,

    /// Manage AI prompts
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (claim_insights, claim_outcome)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (same shape as the API)
    Json,
    /// Human-readable summary
    Text,
}
