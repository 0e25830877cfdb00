//! Prompts-related command implementations

use anyhow::Result;
use claimdesk_core::prompts::{PromptId, PromptLibrary};

/// List all available prompts and their override status
pub fn cmd_prompts_list(library: &mut PromptLibrary) -> Result<()> {
    println!("{}", format_prompt_list(library));
    Ok(())
}

pub fn format_prompt_list(library: &mut PromptLibrary) -> String {
    let mut out = String::from("Available Prompts:\n\n");

    out.push_str(&format!(
        "{:<20} {:>7}  {:<22}  {}\n",
        "ID", "VERSION", "TASK TYPE", "OVERRIDE"
    ));
    out.push_str(&"-".repeat(64));
    out.push('\n');

    for info in library.list() {
        let override_status = if info.has_override {
            "✓ Custom"
        } else {
            "Default"
        };
        out.push_str(&format!(
            "{:<20} {:>7}  {:<22}  {}\n",
            info.id, info.version, info.task_type, override_status
        ));
    }

    out.push_str(&format!(
        "\nOverride directory: {}\n",
        library
            .override_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not available)".to_string())
    ));
    out.push_str("\nTo customize a prompt:\n");
    out.push_str("  1. Copy the default to the override directory\n");
    out.push_str("  2. Edit the file, keeping the frontmatter and the # System / # User headers\n");
    out.push_str("  3. Restart the server to use the new prompt");
    out
}

/// Show the content of a specific prompt
pub fn cmd_prompts_show(library: &mut PromptLibrary, prompt_id: &str) -> Result<()> {
    let id: PromptId = match prompt_id.parse() {
        Ok(id) => id,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(());
        }
    };
    println!("{}", format_prompt(library, id)?);
    Ok(())
}

pub fn format_prompt(library: &mut PromptLibrary, id: PromptId) -> Result<String> {
    let prompt = library.get(id)?;

    let mut out = format!(
        "Prompt: {}\nVersion: {}\nTask Type: {}\nSource: {}\n",
        prompt.metadata.id,
        prompt.metadata.version,
        prompt.metadata.task_type,
        if prompt.is_override {
            "Override"
        } else {
            "Default"
        }
    );
    if let Some(ref path) = prompt.override_path {
        out.push_str(&format!("Override Path: {}\n", path.display()));
    }
    out.push_str("\n--- Content ---\n");
    out.push_str(&prompt.content);
    Ok(out)
}

/// Show the path where prompt overrides should be placed
pub fn cmd_prompts_path(library: &PromptLibrary) -> Result<()> {
    match library.override_dir() {
        Some(path) => {
            println!("{}", path.display());

            if !path.exists() {
                eprintln!();
                eprintln!("Note: This directory does not exist yet.");
                eprintln!("Create it to start adding custom prompts.");
            }
        }
        None => {
            eprintln!("Could not determine prompts directory.");
            eprintln!("The data directory is not available on this system.");
        }
    }

    Ok(())
}
