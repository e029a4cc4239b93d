//! Domain types: the parsed command, the relay outcome and the reply sent
//! to the owner.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────
// TaskCommand
// ─────────────────────────────────────────────

/// A fully parsed `Task ...` command.
///
/// Every field is trimmed and non-empty; the parser never produces a
/// partially filled command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCommand {
    /// Task name (first segment, after the keyword).
    pub task: String,
    /// Deadline exactly as written, `YYYY-MM-DD`.
    pub deadline: String,
    /// Free-text assignee.
    pub assign_to: String,
    /// Single whitespace-free token, usually a URL.
    pub attachment: String,
    /// Everything after the fourth pipe; may itself contain pipes.
    pub description: String,
}

impl TaskCommand {
    /// One-line summary for logs: `task | deadline | assignee`.
    pub fn summary(&self) -> String {
        format!("{} | {} | {}", self.task, self.deadline, self.assign_to)
    }
}

// ─────────────────────────────────────────────
// RelayOutcome
// ─────────────────────────────────────────────

/// Result of handing a `TaskCommand` to the record sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The sink accepted the record. Echoes the identifying fields.
    Success {
        task: String,
        deadline: String,
        assign_to: String,
    },
    /// The sink rejected the record or could not be reached.
    Failure { cause: String },
}

impl RelayOutcome {
    /// Build a success outcome echoing the command.
    pub fn success(cmd: &TaskCommand) -> Self {
        RelayOutcome::Success {
            task: cmd.task.clone(),
            deadline: cmd.deadline.clone(),
            assign_to: cmd.assign_to.clone(),
        }
    }

    /// Build a failure outcome.
    pub fn failure(cause: impl Into<String>) -> Self {
        RelayOutcome::Failure {
            cause: cause.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RelayOutcome::Success { .. })
    }
}

impl fmt::Display for RelayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayOutcome::Success {
                task,
                deadline,
                assign_to,
            } => write!(f, "✅ Task added: {task} | {deadline} | {assign_to}"),
            RelayOutcome::Failure { cause } => {
                write!(f, "❌ Failed to add task to Airtable: {cause}")
            }
        }
    }
}

// ─────────────────────────────────────────────
// ReplyMessage
// ─────────────────────────────────────────────

/// Outbound notification addressed to the owner.
///
/// Content is always `<senderName> - <glyph> <detail>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyMessage {
    /// Recipient JID (the configured owner).
    pub to: String,
    /// Text body.
    pub content: String,
}

impl ReplyMessage {
    /// Compose the reply for a relay outcome.
    pub fn for_outcome(
        owner: impl Into<String>,
        sender_name: &str,
        outcome: &RelayOutcome,
    ) -> Self {
        ReplyMessage {
            to: owner.into(),
            content: format!("{sender_name} - {outcome}"),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_command() -> TaskCommand {
        TaskCommand {
            task: "Buy milk".into(),
            deadline: "2025-03-01".into(),
            assign_to: "Alice".into(),
            attachment: "http://x/y".into(),
            description: "pick 2% fat".into(),
        }
    }

    #[test]
    fn test_summary() {
        assert_eq!(sample_command().summary(), "Buy milk | 2025-03-01 | Alice");
    }

    #[test]
    fn test_success_reply_format() {
        let outcome = RelayOutcome::success(&sample_command());
        let reply = ReplyMessage::for_outcome("1555@s.whatsapp.net", "Bob", &outcome);
        assert_eq!(reply.to, "1555@s.whatsapp.net");
        assert_eq!(
            reply.content,
            "Bob - ✅ Task added: Buy milk | 2025-03-01 | Alice"
        );
    }

    #[test]
    fn test_failure_reply_format() {
        let outcome = RelayOutcome::failure("airtable error: 422 Unprocessable Entity");
        let reply = ReplyMessage::for_outcome("owner@s.whatsapp.net", "Bob", &outcome);
        assert_eq!(
            reply.content,
            "Bob - ❌ Failed to add task to Airtable: airtable error: 422 Unprocessable Entity"
        );
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_success_echoes_only_identifying_fields() {
        match RelayOutcome::success(&sample_command()) {
            RelayOutcome::Success {
                task,
                deadline,
                assign_to,
            } => {
                assert_eq!(task, "Buy milk");
                assert_eq!(deadline, "2025-03-01");
                assert_eq!(assign_to, "Alice");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }
}
