//! `tasklink parse`: dry-run the task grammar against a message.

use anyhow::Result;
use colored::Colorize;

use tasklink_core::command::parse_task_command;
use tasklink_core::types::TaskCommand;

pub fn run(text: &str) -> Result<()> {
    println!();
    match parse_task_command(text.trim()) {
        Some(cmd) => {
            println!("  {} task command", "✓".green());
            for (label, value) in fields(&cmd) {
                println!("  {:<14} {}", label.bold(), value);
            }
        }
        None => {
            println!("  {} not a task command (would be ignored)", "·".dimmed());
            println!(
                "    {}",
                "Expected: Task <name> | YYYY-MM-DD | <assignee> | <attachment> | <description>"
                    .dimmed()
            );
        }
    }
    println!();
    Ok(())
}

fn fields(cmd: &TaskCommand) -> [(&'static str, &str); 5] {
    [
        ("Task:", &cmd.task),
        ("Deadline:", &cmd.deadline),
        ("Assign To:", &cmd.assign_to),
        ("Attachment:", &cmd.attachment),
        ("Description:", &cmd.description),
    ]
}
