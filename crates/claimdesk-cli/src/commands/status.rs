//! AI backend status command

use anyhow::Result;
use claimdesk_core::{AIBackend, InsightsGenerator};

/// Print backend configuration and whether it answers a health check
pub async fn cmd_status(generator: &InsightsGenerator) -> Result<()> {
    let info = generator.ai().info();

    println!("AI Backend Status:\n");
    println!("  Backend:    {}", info.backend);
    println!("  Host:       {}", info.host);
    println!("  Model:      {}", info.model);
    println!("  Timeout:    {}s", generator.timeout().as_secs());

    if !info.configured {
        println!("  API key:    ✗ not set");
        println!();
        println!("Set OPENAI_API_KEY to enable AI insights.");
        println!("Without it, every request returns the fallback response.");
        return Ok(());
    }
    println!("  API key:    ✓ configured");

    if generator.ai().health_check().await {
        println!("  Connection: ✓ reachable");
    } else {
        println!("  Connection: ✗ not responding");
        println!();
        println!("Check OPENAI_BASE_URL and that the key is valid.");
    }

    Ok(())
}
