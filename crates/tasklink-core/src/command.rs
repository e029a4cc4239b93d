//! Task command grammar.
//!
//! ```text
//! Task <name> | YYYY-MM-DD | <assignee> | <token> | <description>
//! ```
//!
//! The keyword is case-insensitive. Name and assignee may not contain `|`,
//! the date must be zero-padded digits, the token may not contain whitespace
//! and the description runs to the end of the line (pipes allowed). Anything
//! that does not fit is "no command", never an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::TaskCommand;

/// Single anchored pattern; one capture group per segment.
static TASK_COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^Task\s+([^|\r\n]+?)\s*\|\s*([0-9]{4}-[0-9]{2}-[0-9]{2})\s*\|\s*([^|\r\n]+?)\s*\|\s*([^\s|]+)\s*\|\s*(.+)",
    )
    .expect("task command pattern is valid")
});

/// Parse a `Task ...` command out of message text.
///
/// Returns `None` unless all five segments are present and non-empty after
/// trimming.
pub fn parse_task_command(text: &str) -> Option<TaskCommand> {
    let caps = TASK_COMMAND_RE.captures(text)?;
    let segment = |i: usize| caps.get(i).map(|m| m.as_str().trim()).unwrap_or("");

    let fields = [segment(1), segment(2), segment(3), segment(4), segment(5)];
    if fields.iter().any(|f| f.is_empty()) {
        return None;
    }

    Some(TaskCommand {
        task: fields[0].to_string(),
        deadline: fields[1].to_string(),
        assign_to: fields[2].to_string(),
        attachment: fields[3].to_string(),
        description: fields[4].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_command() {
        let cmd = parse_task_command("Task Buy milk | 2025-03-01 | Alice | http://x/y | pick 2% fat")
            .unwrap();
        assert_eq!(cmd.task, "Buy milk");
        assert_eq!(cmd.deadline, "2025-03-01");
        assert_eq!(cmd.assign_to, "Alice");
        assert_eq!(cmd.attachment, "http://x/y");
        assert_eq!(cmd.description, "pick 2% fat");
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        assert!(parse_task_command("task a | 2025-03-01 | b | c | d").is_some());
        assert!(parse_task_command("TASK a | 2025-03-01 | b | c | d").is_some());
    }

    #[test]
    fn test_keyword_must_lead() {
        assert!(parse_task_command("New Task a | 2025-03-01 | b | c | d").is_none());
        assert!(parse_task_command("Tasks a | 2025-03-01 | b | c | d").is_none());
    }

    #[test]
    fn test_date_must_be_zero_padded() {
        assert!(parse_task_command("Task a | 2025-3-1 | b | c | d").is_none());
        assert!(parse_task_command("Task a | 2025-03-01 | b | c | d").is_some());
    }

    #[test]
    fn test_date_rejects_other_formats() {
        assert!(parse_task_command("Task a | 01-03-2025 | b | c | d").is_none());
        assert!(parse_task_command("Task a | 2025/03/01 | b | c | d").is_none());
        assert!(parse_task_command("Task a | tomorrow | b | c | d").is_none());
    }

    #[test]
    fn test_attachment_with_whitespace_is_no_match() {
        assert!(
            parse_task_command("Task Buy milk | 2025-03-01 | Alice | http://x y | pick").is_none()
        );
        // Extra pipes later on must not let the attachment slide into another segment.
        assert!(parse_task_command(
            "Task Buy milk | 2025-03-01 | Alice | http://x y | pick | more | text"
        )
        .is_none());
    }

    #[test]
    fn test_description_may_contain_pipes() {
        let cmd = parse_task_command("Task a | 2025-03-01 | b | link | one | two | three").unwrap();
        assert_eq!(cmd.attachment, "link");
        assert_eq!(cmd.description, "one | two | three");
    }

    #[test]
    fn test_name_cannot_swallow_pipes() {
        assert!(parse_task_command("Task a | b | 2025-03-01 | c | d | e").is_none());
    }

    #[test]
    fn test_missing_segments_is_no_match() {
        assert!(parse_task_command("Task a | 2025-03-01 | b | c").is_none());
        assert!(parse_task_command("Task a | 2025-03-01 | b | c |").is_none());
        assert!(parse_task_command("Task a | 2025-03-01 | b | c |    ").is_none());
        assert!(parse_task_command("Task").is_none());
        assert!(parse_task_command("").is_none());
    }

    #[test]
    fn test_blank_name_is_no_match() {
        assert!(parse_task_command("Task   | 2025-03-01 | b | c | d").is_none());
    }

    #[test]
    fn test_segments_are_trimmed() {
        let cmd = parse_task_command("Task   Fix roof   |2025-12-31|  Bob  |https://a.b/c|   soon  ")
            .unwrap();
        assert_eq!(cmd.task, "Fix roof");
        assert_eq!(cmd.assign_to, "Bob");
        assert_eq!(cmd.attachment, "https://a.b/c");
        assert_eq!(cmd.description, "soon");
    }

    #[test]
    fn test_conversation_mentioning_task_is_ignored() {
        assert!(parse_task_command("Task for today: call mom").is_none());
        assert!(parse_task_command("task done, thanks!").is_none());
    }
}
