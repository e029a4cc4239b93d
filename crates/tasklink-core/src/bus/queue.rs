//! Async event bus backed by a bounded tokio mpsc channel.

use super::types::InboundEvent;
use tokio::sync::mpsc;

/// The bus connecting the live connection → event router.
///
/// - The connection's reader task publishes every decoded event
/// - The router consumes them one at a time and fans out per-message tasks
pub struct EventBus {
    inbound_tx: mpsc::Sender<InboundEvent>,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
}

impl EventBus {
    /// Create a new bus with the given buffer capacity.
    pub fn new(buffer_size: usize) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(buffer_size);

        EventBus {
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
        }
    }

    /// Publish an event from the connection.
    pub async fn publish(
        &self,
        event: InboundEvent,
    ) -> Result<(), mpsc::error::SendError<InboundEvent>> {
        self.inbound_tx.send(event).await
    }

    /// Consume the next event (blocks until available).
    /// Returns None if all senders are dropped.
    pub async fn consume(&self) -> Option<InboundEvent> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await
    }

    /// Get a clone of the sender (for connection reader tasks).
    pub fn sender(&self) -> mpsc::Sender<InboundEvent> {
        self.inbound_tx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::types::MessageEvent;

    #[tokio::test]
    async fn test_event_flow() {
        let bus = EventBus::new(10);

        let msg = MessageEvent::new("1@s.whatsapp.net", "Hello!");
        bus.publish(InboundEvent::Message(msg)).await.unwrap();

        match bus.consume().await.unwrap() {
            InboundEvent::Message(m) => assert_eq!(m.body, "Hello!"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_event_ordering() {
        let bus = EventBus::new(10);

        for i in 1..=3 {
            let msg = MessageEvent::new("1@s.whatsapp.net", format!("msg-{}", i));
            bus.publish(InboundEvent::Message(msg)).await.unwrap();
        }

        for i in 1..=3 {
            match bus.consume().await.unwrap() {
                InboundEvent::Message(m) => assert_eq!(m.body, format!("msg-{}", i)),
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_sender_clone_works() {
        let bus = EventBus::new(10);
        let sender = bus.sender();

        sender
            .send(InboundEvent::Disconnected {
                reason: "stream end".into(),
            })
            .await
            .unwrap();

        let received = bus.consume().await.unwrap();
        assert_eq!(received.kind(), "disconnected");
    }

    #[tokio::test]
    async fn test_multiple_producers() {
        let bus = std::sync::Arc::new(EventBus::new(10));
        let bus1 = bus.clone();
        let bus2 = bus.clone();

        let h1 = tokio::spawn(async move {
            bus1.publish(InboundEvent::Connected { jid: None }).await.unwrap();
        });
        let h2 = tokio::spawn(async move {
            let msg = MessageEvent::new("2@s.whatsapp.net", "from reader");
            bus2.publish(InboundEvent::Message(msg)).await.unwrap();
        });

        h1.await.unwrap();
        h2.await.unwrap();

        let kinds = [bus.consume().await.unwrap().kind(), bus.consume().await.unwrap().kind()];
        assert!(kinds.contains(&"connected"));
        assert!(kinds.contains(&"message"));
    }
}
