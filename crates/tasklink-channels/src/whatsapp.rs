//! WhatsApp connection: WebSocket client for a WhatsApp Web bridge process.
//!
//! Architecture:
//! - A bridge process (e.g. Baileys or whatsmeow based) speaks the WhatsApp Web
//!   protocol and owns the cryptographic session
//! - We connect as a WebSocket **client** (default `ws://localhost:3001`)
//! - Outbound: `connect` / `send` / `disconnect` JSON frames
//! - Inbound: pairing frames (`qr`, `pair_success`, `qr_timeout`), connect
//!   results (`status`, `auth_failed`), and `message` frames
//!
//! The credential blob the bridge issues at pairing is opaque to us; it is
//! stored by `SessionStore` and handed back verbatim on reconnect.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use tasklink_core::bus::types::{InboundEvent, MessageEvent};
use tasklink_core::session::StoredSession;

use crate::base::{ConnectError, Connection, QrEvent};

// ─────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────

/// Default bridge WebSocket URL.
const DEFAULT_BRIDGE_URL: &str = "ws://localhost:3001";

/// Default wait for the bridge to accept stored credentials.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Buffered pairing events.
const QR_CHANNEL_CAPACITY: usize = 16;

/// Type alias for the WebSocket sink.
type WsSender = futures_util::stream::SplitSink<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    tokio_tungstenite::tungstenite::Message,
>;

type ConnectReply = oneshot::Sender<Result<(), ConnectError>>;

// ─────────────────────────────────────────────
// Frame handling state
// ─────────────────────────────────────────────

/// State shared between the connection handle and its reader task.
struct BridgeState {
    /// Where decoded events go (the `EventBus` sender).
    events: mpsc::Sender<InboundEvent>,
    /// Open pairing channel, if a pairing is in progress.
    qr_tx: Mutex<Option<mpsc::Sender<QrEvent>>>,
    /// Waiter for the result of a credentialed `connect`.
    pending: Mutex<Option<ConnectReply>>,
}

impl BridgeState {
    fn new(events: mpsc::Sender<InboundEvent>) -> Self {
        Self {
            events,
            qr_tx: Mutex::new(None),
            pending: Mutex::new(None),
        }
    }

    /// Resolve the pending `connect`, if any. Returns whether one was waiting.
    async fn resolve(&self, result: Result<(), ConnectError>) -> bool {
        match self.pending.lock().await.take() {
            Some(reply) => {
                let _ = reply.send(result);
                true
            }
            None => false,
        }
    }

    async fn publish(&self, event: InboundEvent) {
        if let Err(e) = self.events.send(event).await {
            error!(error = %e, "failed to publish whatsapp event to bus");
        }
    }

    async fn forward_qr(&self, event: QrEvent) {
        let guard = self.qr_tx.lock().await;
        match guard.as_ref() {
            Some(tx) => {
                if tx.send(event).await.is_err() {
                    debug!("pairing channel receiver dropped");
                }
            }
            None => debug!("pairing frame received with no pairing in progress"),
        }
    }

    /// Parse and handle one JSON frame from the bridge.
    async fn handle_frame(&self, raw: &str) -> anyhow::Result<()> {
        let payload: Value = serde_json::from_str(raw)?;
        let frame_type = payload["type"].as_str().unwrap_or("");

        match frame_type {
            "message" => {
                self.publish(InboundEvent::Message(parse_message(&payload))).await;
            }
            "qr" => {
                let code = payload["qr"].as_str().unwrap_or("").to_string();
                if code.is_empty() {
                    warn!("whatsapp bridge sent an empty qr code");
                } else {
                    self.forward_qr(QrEvent::Code(code)).await;
                }
            }
            "pair_success" => {
                let jid = payload["jid"].as_str().unwrap_or("").to_string();
                let stored = StoredSession::new(jid, payload["creds"].clone());
                self.forward_qr(QrEvent::Success(stored)).await;
                // Pairing is over; close the channel.
                self.qr_tx.lock().await.take();
            }
            "qr_timeout" => {
                self.forward_qr(QrEvent::Timeout).await;
                self.qr_tx.lock().await.take();
            }
            "status" => {
                let status = payload["status"].as_str().unwrap_or("unknown");
                if status == "connected" {
                    let jid = payload["jid"].as_str().map(String::from);
                    if !self.resolve(Ok(())).await {
                        info!("whatsapp bridge: connected to WhatsApp");
                    }
                    self.publish(InboundEvent::Connected { jid }).await;
                } else {
                    debug!(status = status, "whatsapp bridge status update");
                    if self.qr_tx.lock().await.is_some() {
                        self.forward_qr(QrEvent::Other(format!("status:{status}"))).await;
                    } else if matches!(status, "disconnected" | "close") {
                        self.publish(InboundEvent::Disconnected {
                            reason: status.to_string(),
                        })
                        .await;
                    }
                }
            }
            "auth_failed" => {
                let reason = payload["reason"].as_str().unwrap_or("unknown").to_string();
                if !self.resolve(Err(ConnectError::Rejected(reason.clone()))).await {
                    warn!(reason = %reason, "whatsapp bridge: authentication failed");
                    self.publish(InboundEvent::LoggedOut { reason }).await;
                }
            }
            "logged_out" => {
                let reason = payload["reason"].as_str().unwrap_or("logged out").to_string();
                if !self.resolve(Err(ConnectError::Rejected(reason.clone()))).await {
                    self.publish(InboundEvent::LoggedOut { reason }).await;
                }
            }
            "sent" => {
                let to = payload["to"].as_str().unwrap_or("?");
                debug!(to = to, "whatsapp message sent confirmation");
            }
            "error" => {
                let err = payload["error"].as_str().unwrap_or("unknown").to_string();
                error!(error = %err, "whatsapp bridge error");
                self.resolve(Err(ConnectError::Transport(err))).await;
            }
            _ => {
                debug!(frame_type = frame_type, "whatsapp bridge: unknown frame type");
            }
        }

        Ok(())
    }

    /// The socket is gone: fail any waiter and end any pairing.
    async fn socket_closed(&self, reason: &str) {
        self.resolve(Err(ConnectError::Transport(reason.to_string())))
            .await;
        self.qr_tx.lock().await.take();
        self.publish(InboundEvent::Disconnected {
            reason: reason.to_string(),
        })
        .await;
    }
}

/// Decode a `message` frame.
///
/// Prefers `pn` (phone-based JID) over `sender` (LID-based JID) for the
/// sender identity. A missing or malformed `timestamp` reads as the epoch,
/// so the history filter drops the message.
fn parse_message(payload: &Value) -> MessageEvent {
    let raw_sender = payload["sender"].as_str().unwrap_or("");
    let sender = payload["pn"]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(raw_sender)
        .to_string();
    let timestamp = payload["timestamp"]
        .as_i64()
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    MessageEvent {
        id: payload["id"].as_str().unwrap_or("").to_string(),
        sender,
        push_name: payload["pushName"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(String::from),
        body: payload["content"].as_str().unwrap_or("").to_string(),
        from_me: payload["fromMe"].as_bool().unwrap_or(false),
        timestamp,
    }
}

// ─────────────────────────────────────────────
// BridgeConnection
// ─────────────────────────────────────────────

/// WhatsApp connection through a bridge WebSocket.
pub struct BridgeConnection {
    /// Bridge WebSocket URL.
    bridge_url: String,
    /// How long to wait for the bridge to accept stored credentials.
    connect_timeout: Duration,
    /// State shared with the reader task.
    state: Arc<BridgeState>,
    /// Active WebSocket write half.
    ws_write: Arc<Mutex<Option<WsSender>>>,
    /// Reader task for the current socket.
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl BridgeConnection {
    /// Create a new bridge connection publishing to `events`.
    pub fn new(
        bridge_url: String,
        connect_timeout_secs: Option<u64>,
        events: mpsc::Sender<InboundEvent>,
    ) -> Self {
        let url = if bridge_url.is_empty() {
            DEFAULT_BRIDGE_URL.to_string()
        } else {
            bridge_url
        };

        Self {
            bridge_url: url,
            connect_timeout: Duration::from_secs(
                connect_timeout_secs.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
            ),
            state: Arc::new(BridgeState::new(events)),
            ws_write: Arc::new(Mutex::new(None)),
            reader: Mutex::new(None),
        }
    }

    /// Bridge URL in use.
    pub fn bridge_url(&self) -> &str {
        &self.bridge_url
    }

    /// Open the socket and spawn its reader, unless already open.
    async fn ensure_socket(&self) -> Result<(), ConnectError> {
        use futures_util::StreamExt;
        use tokio_tungstenite::tungstenite::Message as WsMessage;

        let mut write_guard = self.ws_write.lock().await;
        if write_guard.is_some() {
            return Ok(());
        }

        debug!(url = %self.bridge_url, "connecting to whatsapp bridge");
        let (ws_stream, _) = tokio_tungstenite::connect_async(&self.bridge_url)
            .await
            .map_err(|e| ConnectError::Transport(e.to_string()))?;
        info!(url = %self.bridge_url, "connected to whatsapp bridge");

        let (write, mut read) = ws_stream.split();
        *write_guard = Some(write);
        drop(write_guard);

        let state = self.state.clone();
        let ws_write = self.ws_write.clone();
        let handle = tokio::spawn(async move {
            let reason = loop {
                let msg = match read.next().await {
                    Some(Ok(m)) => m,
                    Some(Err(e)) => {
                        error!(error = %e, "whatsapp ws read error");
                        break e.to_string();
                    }
                    None => break "bridge stream ended".to_string(),
                };

                let text = match msg {
                    WsMessage::Text(t) => t.as_str().to_string(),
                    WsMessage::Close(_) => {
                        info!("whatsapp bridge closed connection");
                        break "bridge closed connection".to_string();
                    }
                    _ => continue,
                };

                if let Err(e) = state.handle_frame(&text).await {
                    warn!(error = %e, "failed to handle bridge frame");
                }
            };

            ws_write.lock().await.take();
            state.socket_closed(&reason).await;
        });

        if let Some(old) = self.reader.lock().await.replace(handle) {
            old.abort();
        }
        Ok(())
    }

    /// Serialize and send one frame.
    async fn send_frame(&self, frame: Value) -> anyhow::Result<()> {
        use futures_util::SinkExt;
        use tokio_tungstenite::tungstenite::Message as WsMessage;

        let mut guard = self.ws_write.lock().await;
        let write = match guard.as_mut() {
            Some(w) => w,
            None => anyhow::bail!("whatsapp bridge not connected"),
        };
        write.send(WsMessage::text(frame.to_string())).await?;
        Ok(())
    }
}

#[async_trait]
impl Connection for BridgeConnection {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn qr_channel(&self) -> Result<mpsc::Receiver<QrEvent>, ConnectError> {
        let (tx, rx) = mpsc::channel(QR_CHANNEL_CAPACITY);
        *self.state.qr_tx.lock().await = Some(tx);
        Ok(rx)
    }

    async fn connect(&self, credentials: Option<&StoredSession>) -> Result<(), ConnectError> {
        self.ensure_socket().await?;

        let Some(stored) = credentials else {
            info!("requesting pairing from whatsapp bridge");
            return self
                .send_frame(json!({ "type": "connect", "creds": Value::Null }))
                .await
                .map_err(|e| ConnectError::Transport(e.to_string()));
        };

        let (tx, rx) = oneshot::channel();
        *self.state.pending.lock().await = Some(tx);

        self.send_frame(json!({
            "type": "connect",
            "jid": stored.jid,
            "creds": stored.creds,
        }))
        .await
        .map_err(|e| ConnectError::Transport(e.to_string()))?;

        match tokio::time::timeout(self.connect_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ConnectError::Transport("bridge went away".to_string())),
            Err(_) => {
                self.state.pending.lock().await.take();
                Err(ConnectError::Timeout(self.connect_timeout.as_secs()))
            }
        }
    }

    async fn disconnect(&self) {
        use futures_util::SinkExt;
        use tokio_tungstenite::tungstenite::Message as WsMessage;

        info!("disconnecting from whatsapp bridge");
        if let Some(mut write) = self.ws_write.lock().await.take() {
            let _ = write
                .send(WsMessage::text(json!({ "type": "disconnect" }).to_string()))
                .await;
            let _ = write.send(WsMessage::Close(None)).await;
        }
        if let Some(reader) = self.reader.lock().await.take() {
            reader.abort();
        }
        self.state.qr_tx.lock().await.take();
    }

    async fn send_text(&self, to: &str, text: &str) -> anyhow::Result<()> {
        self.send_frame(json!({
            "type": "send",
            "to": to,
            "text": text
        }))
        .await?;
        debug!(to = %to, "whatsapp message sent");
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
