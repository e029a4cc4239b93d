//! Tasklink CLI: entry point.
//!
//! # Commands
//!
//! - `tasklink run [--logs] [--json-logs]`: pair/reconnect WhatsApp and relay tasks
//! - `tasklink onboard`: write a default config file
//! - `tasklink status`: show configuration and session state
//! - `tasklink parse <TEXT>`: check a message against the task grammar

mod gateway;
mod health;
mod helpers;
mod onboard;
mod parse_cmd;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Tasklink: WhatsApp to Airtable task tracker
#[derive(Parser)]
#[command(name = "tasklink", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to WhatsApp and relay task commands until stopped
    Run {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,

        /// Emit logs as JSON lines
        #[arg(long, default_value_t = false)]
        json_logs: bool,
    },

    /// Create the default configuration file
    Onboard,

    /// Show configuration and session status
    Status,

    /// Parse a message as a task command without relaying it
    Parse {
        /// Message text, e.g. "Task Fix login | 2024-12-31 | Alice | https://x.y/a.png | urgent"
        text: String,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { logs, json_logs } => {
            init_logging(logs, json_logs);
            gateway::run().await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
        Commands::Parse { text } => parse_cmd::run(&text),
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool, json: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("tasklink=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}
