//! `tasklink onboard`: create the config file with defaults.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use tasklink_core::config::{get_config_path, save_config, Config};

pub fn run() -> Result<()> {
    println!();
    println!("{}", "📋 Tasklink: Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    write_default_config(&config_path)?;

    println!();
    println!("  Next steps:");
    println!("    1. Set {} and {} in the config file", "airtable.*".bold(), "owner.jid".bold());
    println!("       (or TASKLINK_AIRTABLE__API_KEY, TASKLINK_OWNER__JID, ...)");
    println!("    2. Start the WhatsApp bridge");
    println!("    3. Run {} and scan the QR code", "tasklink run".bold());
    println!();

    Ok(())
}

/// Write a default config at `path` unless one exists. Returns whether it wrote.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        println!("  {} config already exists at {}", "✓".green(), path.display());
        return Ok(false);
    }

    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("  {} created config at {}", "✓".green(), path.display());
    Ok(true)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
