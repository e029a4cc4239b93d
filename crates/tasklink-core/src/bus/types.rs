//! Bus event types: what the live connection reports to the router.

use chrono::{DateTime, Utc};

/// Everything the live connection can emit once the session is up.
///
/// Only `Message` drives the task pipeline; the rest are connection
/// lifecycle notifications the router logs.
#[derive(Clone, Debug, PartialEq)]
pub enum InboundEvent {
    /// A chat message.
    Message(MessageEvent),
    /// The bridge reports the account is online.
    Connected { jid: Option<String> },
    /// The bridge lost its upstream connection.
    Disconnected { reason: String },
    /// The companion device was unlinked; a new pairing is required.
    LoggedOut { reason: String },
}

impl InboundEvent {
    /// Short kind label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Message(_) => "message",
            InboundEvent::Connected { .. } => "connected",
            InboundEvent::Disconnected { .. } => "disconnected",
            InboundEvent::LoggedOut { .. } => "logged_out",
        }
    }
}

/// A single inbound chat message.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageEvent {
    /// Message identifier assigned by the network.
    pub id: String,
    /// Raw sender JID (e.g. `34612345678@s.whatsapp.net`).
    pub sender: String,
    /// Sender's display ("push") name, if the network provided one.
    pub push_name: Option<String>,
    /// Plain text body.
    pub body: String,
    /// `true` when the message was sent by our own account.
    pub from_me: bool,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
}

impl MessageEvent {
    /// Create a message with minimal required fields, timestamped now.
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        MessageEvent {
            id: String::new(),
            sender: sender.into(),
            push_name: None,
            body: body.into(),
            from_me: false,
            timestamp: Utc::now(),
        }
    }

    /// User part of the sender JID: `34612:7@s.whatsapp.net` → `34612`.
    pub fn sender_user(&self) -> &str {
        let user = self.sender.split('@').next().unwrap_or(&self.sender);
        user.split(':').next().unwrap_or(user)
    }

    /// Name used in replies: the push name, else the sender's user part.
    pub fn display_name(&self) -> &str {
        match self.push_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.sender_user(),
        }
    }
}
