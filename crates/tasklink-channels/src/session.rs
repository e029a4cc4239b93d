//! Session manager: brings the live connection up exactly once per run.
//!
//! ```text
//! Uninitialized ──(no credentials)──▶ AwaitingQr ──success──▶ Connected
//!       │                                  └──timeout──▶ Failed
//!       └──(credentials)──▶ Reconnecting ──ok──▶ Connected
//!                                 └──error──▶ Failed
//! ```
//!
//! Nothing here retries: a QR flow needs a human holding a phone, so every
//! failure ends the run and the operator restarts.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use tasklink_core::session::{SessionStore, SessionStoreError, StoredSession};

use crate::base::{ConnectError, Connection, QrEvent};

/// Callback invoked with every pairing code the bridge issues.
pub type OnQrCodeFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Lifecycle state of the one session this process owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    AwaitingQr,
    Reconnecting,
    Connected,
    Failed,
}

/// The established session handed to the rest of the program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    /// Device JID, when known.
    pub identity: Option<String>,
    pub state: SessionState,
}

/// Why the session could not be established.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] SessionStoreError),
    #[error("could not start pairing: {0}")]
    Pairing(ConnectError),
    #[error("QR code timed out, restart to get a new one")]
    QrTimeout,
    #[error("pairing channel closed before a code was scanned")]
    PairingAborted,
    #[error("stored credentials were rejected ({reason}), restart to scan a new QR code")]
    CredentialsRejected {
        reason: String,
        backup: Option<PathBuf>,
    },
    #[error("could not connect with stored credentials: {0}")]
    Connect(ConnectError),
}

/// Owns the credential store and drives the connection to `Connected`.
pub struct SessionManager {
    store: SessionStore,
    connection: Arc<dyn Connection>,
    on_qr_code: OnQrCodeFn,
    state: SessionState,
    identity: Option<String>,
}

impl SessionManager {
    pub fn new(store: SessionStore, connection: Arc<dyn Connection>, on_qr_code: OnQrCodeFn) -> Self {
        Self {
            store,
            connection,
            on_qr_code,
            state: SessionState::Uninitialized,
            identity: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Load credentials and connect, pairing first if there are none.
    ///
    /// Returns only in `Connected`; any error leaves the manager `Failed`.
    pub async fn establish(&mut self) -> Result<Session, SessionError> {
        self.state = SessionState::Uninitialized;

        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(e) => {
                self.state = SessionState::Failed;
                return Err(e.into());
            }
        };

        match stored {
            Some(stored) => {
                info!(jid = %stored.jid, "found stored credentials");
                self.reconnect(stored).await
            }
            None => {
                info!(path = %self.store.path().display(), "no stored session, pairing required");
                self.pair().await
            }
        }
    }

    /// First-time pairing over the QR channel.
    async fn pair(&mut self) -> Result<Session, SessionError> {
        self.state = SessionState::AwaitingQr;

        let mut qr = match self.connection.qr_channel().await {
            Ok(rx) => rx,
            Err(e) => return self.fail(SessionError::Pairing(e)).await,
        };
        if let Err(e) = self.connection.connect(None).await {
            return self.fail(SessionError::Pairing(e)).await;
        }

        while let Some(event) = qr.recv().await {
            match event {
                QrEvent::Code(code) => {
                    debug!(len = code.len(), "qr code issued");
                    (self.on_qr_code)(&code);
                }
                QrEvent::Success(stored) => {
                    info!(jid = %stored.jid, "paired successfully");
                    if let Err(e) = self.store.save(&stored) {
                        return self.fail(e.into()).await;
                    }
                    return Ok(self.connected(stored));
                }
                QrEvent::Timeout => {
                    warn!("qr code timed out");
                    return self.fail(SessionError::QrTimeout).await;
                }
                QrEvent::Other(signal) => {
                    debug!(signal = %signal, "ignoring pairing signal");
                }
            }
        }

        self.fail(SessionError::PairingAborted).await
    }

    /// Resume with stored credentials.
    async fn reconnect(&mut self, stored: StoredSession) -> Result<Session, SessionError> {
        self.state = SessionState::Reconnecting;

        match self.connection.connect(Some(&stored)).await {
            Ok(()) => {
                info!(jid = %stored.jid, "connected with existing session");
                Ok(self.connected(stored))
            }
            Err(e) if e.invalidates_credentials() => {
                warn!(error = %e, "stored credentials rejected, backing them up");
                self.connection.disconnect().await;

                let backup = match self.store.invalidate_and_backup() {
                    Ok(backup) => backup,
                    Err(backup_err) => {
                        error!(error = %backup_err, "failed to back up credentials");
                        None
                    }
                };

                self.state = SessionState::Failed;
                let reason = match e {
                    ConnectError::Rejected(reason) => reason,
                    other => other.to_string(),
                };
                Err(SessionError::CredentialsRejected { reason, backup })
            }
            Err(e) => {
                warn!(error = %e, "reconnect failed, keeping stored credentials");
                self.fail(SessionError::Connect(e)).await
            }
        }
    }

    fn connected(&mut self, stored: StoredSession) -> Session {
        self.state = SessionState::Connected;
        self.identity = Some(stored.jid);
        Session {
            identity: self.identity.clone(),
            state: self.state,
        }
    }

    async fn fail(&mut self, err: SessionError) -> Result<Session, SessionError> {
        self.connection.disconnect().await;
        self.state = SessionState::Failed;
        Err(err)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
