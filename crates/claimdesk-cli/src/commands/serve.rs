//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use claimdesk_core::insights::generator::TIMEOUT_ENV_VAR;
use claimdesk_core::InsightsGenerator;

pub async fn cmd_serve(
    host: &str,
    port: u16,
    no_auth: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    let generator = InsightsGenerator::from_env();
    let info = generator.ai().info();

    println!("🚀 Starting Claimdesk web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   AI backend: {} ({}, model {})",
        info.backend, info.host, info.model
    );
    println!(
        "   AI timeout: {}s ({})",
        generator.timeout().as_secs(),
        TIMEOUT_ENV_VAR
    );
    if !info.configured {
        println!("   ⚠️  OPENAI_API_KEY not set - insights will use the fallback response");
    }
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    // Parse API keys and CORS origins from environment (comma-separated)
    let api_keys =
        claimdesk_server::parse_list(&std::env::var("CLAIMDESK_API_KEYS").unwrap_or_default());
    let allowed_origins = claimdesk_server::parse_list(
        &std::env::var("CLAIMDESK_ALLOWED_ORIGINS").unwrap_or_default(),
    );

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if api_keys.is_empty() {
        println!("   🔒 Authentication: API key (none configured - set CLAIMDESK_API_KEYS)");
    } else {
        println!(
            "   🔑 API keys: {} configured (CLAIMDESK_API_KEYS)",
            api_keys.len()
        );
    }
    if !allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", allowed_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let config = claimdesk_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins,
        api_keys,
    };

    let static_dir_str = static_dir
        .map(|p| p.to_str().context("static_dir path must be valid UTF-8"))
        .transpose()?;
    claimdesk_server::serve_with_config(generator, host, port, static_dir_str, config).await?;

    Ok(())
}
