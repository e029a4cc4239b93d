//! Shared CLI helpers: banner and operator messages.

use colored::Colorize;

/// Print the startup banner.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "📋 Tasklink".cyan().bold(), version.dimmed());
    println!("{}", "WhatsApp → Airtable task tracker".dimmed());
    println!();
}

/// Print a pairing code for the operator to scan.
pub fn print_qr_code(code: &str) {
    println!();
    println!(
        "{}",
        "Scan this code with WhatsApp (Linked devices → Link a device):".yellow().bold()
    );
    println!("{code}");
    println!();
}

/// Print a fatal startup error and what to do about it.
pub fn print_fatal(message: &str, hint: &str) {
    eprintln!();
    eprintln!("  {} {}", "✗".red().bold(), message.red());
    if !hint.is_empty() {
        eprintln!("    {}", hint.dimmed());
    }
    eprintln!();
}
