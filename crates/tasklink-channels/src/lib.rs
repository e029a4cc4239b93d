//! Tasklink Channels: everything that touches the live messaging connection.
//!
//! This crate provides:
//! - **base**: the `Connection` trait plus pairing (`QrEvent`) and connect error types
//! - **whatsapp**: `BridgeConnection`, a WebSocket client for a WhatsApp Web bridge
//! - **session**: `SessionManager`: pairing, reconnect and credential recovery
//! - **notifier**: `Notifier`: best-effort delivery of replies to the owner

pub mod base;
pub mod notifier;
pub mod session;
pub mod whatsapp;

#[cfg(test)]
mod mock;

pub use base::{ConnectError, Connection, QrEvent};
pub use notifier::Notifier;
pub use session::{OnQrCodeFn, Session, SessionError, SessionManager, SessionState};
pub use whatsapp::BridgeConnection;
