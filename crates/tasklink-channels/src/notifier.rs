//! Owner notifier: tells the account owner what happened to each task.

use std::sync::Arc;

use tracing::{debug, warn};

use tasklink_core::types::ReplyMessage;

use crate::base::Connection;

/// Best-effort delivery of replies over the live connection.
///
/// A failed send is logged and dropped; it never reaches the caller.
#[derive(Clone)]
pub struct Notifier {
    connection: Arc<dyn Connection>,
    owner: String,
}

impl Notifier {
    pub fn new(connection: Arc<dyn Connection>, owner: impl Into<String>) -> Self {
        Self {
            connection,
            owner: owner.into(),
        }
    }

    /// JID every reply goes to.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub async fn send(&self, reply: &ReplyMessage) {
        match self.connection.send_text(&reply.to, &reply.content).await {
            Ok(()) => debug!(to = %reply.to, "reply delivered"),
            Err(e) => warn!(
                to = %reply.to,
                channel = self.connection.name(),
                error = %e,
                "failed to deliver reply"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockConnection;
    use tasklink_core::types::{RelayOutcome, TaskCommand};

    fn outcome() -> RelayOutcome {
        RelayOutcome::success(&TaskCommand {
            task: "Buy milk".into(),
            deadline: "2025-01-01".into(),
            assign_to: "Bob".into(),
            attachment: "https://x.y/z".into(),
            description: "2 liters".into(),
        })
    }

    #[tokio::test]
    async fn test_send_reaches_owner() {
        let conn = Arc::new(MockConnection::default());
        let notifier = Notifier::new(conn.clone(), "owner@s.whatsapp.net");
        let reply = ReplyMessage::for_outcome(notifier.owner(), "Alice", &outcome());

        notifier.send(&reply).await;

        let sent = conn.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "owner@s.whatsapp.net");
        assert_eq!(sent[0].1, "Alice - ✅ Task added: Buy milk | 2025-01-01 | Bob");
    }

    #[tokio::test]
    async fn test_send_failure_is_swallowed() {
        let conn = Arc::new(MockConnection {
            fail_sends: true,
            ..Default::default()
        });
        let notifier = Notifier::new(conn.clone(), "owner@s.whatsapp.net");
        let reply = ReplyMessage::for_outcome(notifier.owner(), "Alice", &outcome());

        notifier.send(&reply).await;
        assert!(conn.sent().is_empty());
    }
}
