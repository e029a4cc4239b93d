//! Scripted in-memory connection shared by this crate's tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use tasklink_core::session::StoredSession;

use crate::base::{ConnectError, Connection, QrEvent};

#[derive(Default)]
pub struct MockConnection {
    /// Events delivered on the pairing channel, then the channel closes.
    pub qr_script: Mutex<Vec<QrEvent>>,
    /// Result of the next `connect` call (default `Ok`).
    pub connect_result: Mutex<Option<Result<(), ConnectError>>>,
    /// JIDs passed to `connect` (`None` for pairing).
    pub connects: Mutex<Vec<Option<String>>>,
    pub disconnects: AtomicUsize,
    /// `(to, text)` of every successful send.
    pub sent: Mutex<Vec<(String, String)>>,
    /// Make `send_text` fail.
    pub fail_sends: bool,
}

impl MockConnection {
    pub fn with_qr_script(events: Vec<QrEvent>) -> Self {
        Self {
            qr_script: Mutex::new(events),
            ..Default::default()
        }
    }

    pub fn with_connect_result(result: Result<(), ConnectError>) -> Self {
        Self {
            connect_result: Mutex::new(Some(result)),
            ..Default::default()
        }
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn connect_calls(&self) -> Vec<Option<String>> {
        self.connects.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn name(&self) -> &str {
        "mock"
    }

    async fn qr_channel(&self) -> Result<mpsc::Receiver<QrEvent>, ConnectError> {
        let events: Vec<QrEvent> = self.qr_script.lock().unwrap().drain(..).collect();
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            tx.try_send(event).unwrap();
        }
        Ok(rx)
    }

    async fn connect(&self, credentials: Option<&StoredSession>) -> Result<(), ConnectError> {
        self.connects
            .lock()
            .unwrap()
            .push(credentials.map(|c| c.jid.clone()));
        self.connect_result.lock().unwrap().take().unwrap_or(Ok(()))
    }

    async fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }

    async fn send_text(&self, to: &str, text: &str) -> anyhow::Result<()> {
        if self.fail_sends {
            anyhow::bail!("bridge not connected");
        }
        self.sent.lock().unwrap().push((to.to_string(), text.to_string()));
        Ok(())
    }
}
