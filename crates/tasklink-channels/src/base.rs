//! Connection trait: the abstract interface to the live messaging session.
//!
//! A connection goes through two phases:
//! - **bootstrap**, driven by `SessionManager`: `qr_channel()` + `connect(None)`
//!   for first-time pairing, or `connect(Some(creds))` to resume
//! - **serving**: inbound events are published to the `EventBus`, replies go
//!   out through `send_text()`

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use tasklink_core::session::StoredSession;

/// Events on the pairing (code-exchange) channel.
#[derive(Clone, Debug, PartialEq)]
pub enum QrEvent {
    /// A new code to scan from the phone. Codes rotate until one is scanned.
    Code(String),
    /// The phone scanned a code; carries the credentials to persist.
    Success(StoredSession),
    /// No code was scanned in time.
    Timeout,
    /// Any other signal; informational only.
    Other(String),
}

/// Why `connect` failed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConnectError {
    /// The network refused the stored credentials (logged out, revoked, replaced).
    #[error("credentials rejected: {0}")]
    Rejected(String),
    /// The bridge could not be reached or dropped the connection.
    #[error("transport error: {0}")]
    Transport(String),
    /// No answer within the configured timeout.
    #[error("no response from bridge within {0}s")]
    Timeout(u64),
}

impl ConnectError {
    /// Only a rejection says anything about the stored credentials.
    pub fn invalidates_credentials(&self) -> bool {
        matches!(self, ConnectError::Rejected(_))
    }
}

/// A live, authenticated messaging connection.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Transport name for logging (e.g. "whatsapp").
    fn name(&self) -> &str;

    /// Open the pairing channel. Call before `connect(None)`.
    async fn qr_channel(&self) -> Result<mpsc::Receiver<QrEvent>, ConnectError>;

    /// Connect, resuming `credentials` when given, otherwise starting pairing.
    async fn connect(&self, credentials: Option<&StoredSession>) -> Result<(), ConnectError>;

    /// Close the connection. Safe to call when not connected.
    async fn disconnect(&self);

    /// Send a plain text message to `to` (a JID).
    async fn send_text(&self, to: &str, text: &str) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rejection_invalidates() {
        assert!(ConnectError::Rejected("logged out".into()).invalidates_credentials());
        assert!(!ConnectError::Transport("refused".into()).invalidates_credentials());
        assert!(!ConnectError::Timeout(30).invalidates_credentials());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConnectError::Timeout(30).to_string(),
            "no response from bridge within 30s"
        );
        assert_eq!(
            ConnectError::Rejected("401".into()).to_string(),
            "credentials rejected: 401"
        );
    }
}
