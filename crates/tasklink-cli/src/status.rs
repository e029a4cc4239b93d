//! `tasklink status`: show configuration and session state.

use anyhow::Result;
use colored::Colorize;

use tasklink_core::config::{get_config_path, load_config};
use tasklink_core::session::SessionStore;
use tasklink_core::utils::expand_tilde;

pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "📋 Tasklink Status".cyan().bold());
    println!();

    println!(
        "  {:<14} {} {}",
        "Config:".bold(),
        config_path.display(),
        found(config_path.exists())
    );

    // Session
    let store = SessionStore::new(expand_tilde(&config.session.path));
    let session_state = match store.load() {
        Ok(Some(stored)) => format!("{} paired as {}", "✓".green(), stored.jid),
        Ok(None) => format!("{}", "· not paired (QR scan on next run)".dimmed()),
        Err(e) => format!("{} {}", "✗".red(), e),
    };
    println!("  {:<14} {}", "Session:".bold(), store.path().display());
    println!("  {:<14} {}", "", session_state);

    let backups = store.list_backups();
    if !backups.is_empty() {
        println!("  {:<14} {} found", "Backups:".bold(), backups.len());
        for backup in &backups {
            println!("  {:<14} {}", "", backup.display().to_string().dimmed());
        }
    }

    println!("  {:<14} {}", "Bridge:".bold(), config.session.bridge_url);

    // Sink + owner
    println!();
    println!(
        "  {:<14} {}",
        "Airtable:".bold(),
        configured(config.airtable.is_configured())
    );
    println!(
        "  {:<14} {}",
        "Owner:".bold(),
        if config.owner.jid.is_empty() {
            configured(false)
        } else {
            config.owner.jid.clone()
        }
    );
    println!(
        "  {:<14} {}:{}",
        "Health:".bold(),
        config.health.host,
        config.health.port
    );

    if let Err(e) = config.validate() {
        println!();
        println!("  {} {}", "⚠".yellow(), e);
    }
    println!();

    Ok(())
}

fn found(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

fn configured(ok: bool) -> String {
    if ok {
        format!("{} configured", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    }
}
