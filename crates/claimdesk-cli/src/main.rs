//! Claimdesk CLI - AI insights for trucking claims
//!
//! Usage:
//!   claimdesk serve --port 3000                  Start web server
//!   claimdesk insights --input snapshot.json     Analyze claims, tasks and activities
//!   claimdesk predict --history h.json --claim c.json
//!   claimdesk status                             Check AI backend

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use claimdesk_core::{InsightsGenerator, PromptLibrary};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => commands::cmd_serve(&host, port, no_auth, static_dir.as_deref()).await,
        Commands::Insights { input, format } => {
            let generator = InsightsGenerator::from_env();
            commands::cmd_insights(&generator, &input, format).await
        }
        Commands::Predict {
            history,
            claim,
            format,
        } => {
            let generator = InsightsGenerator::from_env();
            commands::cmd_predict(&generator, history.as_deref(), &claim, format).await
        }
        Commands::Status => commands::cmd_status(&InsightsGenerator::from_env()).await,
        Commands::Prompts { action } => {
            let mut library = PromptLibrary::new();
            match action {
                None | Some(PromptsAction::List) => commands::cmd_prompts_list(&mut library),
                Some(PromptsAction::Show { prompt_id }) => {
                    commands::cmd_prompts_show(&mut library, &prompt_id)
                }
                Some(PromptsAction::Path) => commands::cmd_prompts_path(&library),
            }
        }
    }
}
