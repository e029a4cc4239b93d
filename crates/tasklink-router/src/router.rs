//! Event router: the bus consumer.
//!
//! For every chat message: filter → parse → relay → reply to the owner.
//! Each message is handled in its own task so a slow relay never holds up
//! the next message. A lost or logged-out session ends the run; nothing in
//! the process reconnects.

use std::sync::Arc;

use tracing::{debug, error, info};

use tasklink_core::bus::queue::EventBus;
use tasklink_core::bus::types::{InboundEvent, MessageEvent};
use tasklink_core::command::parse_task_command;
use tasklink_core::types::{RelayOutcome, ReplyMessage};
use tasklink_core::utils::truncate_string;

use crate::context::AppContext;
use crate::filters::{DropReason, FilterChain};

/// What happened to one inbound event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Rejected by the filter chain.
    Dropped(DropReason),
    /// Text did not match the command grammar.
    Ignored,
    /// Parsed and handed to the sink; the owner was notified.
    Relayed(RelayOutcome),
    /// Not a chat message (connection lifecycle event).
    Skipped,
    /// The WhatsApp session is gone.
    SessionEnded { reason: String },
}

/// Why [`EventRouter::run`] returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouterExit {
    /// Every bus sender is gone.
    BusClosed,
    /// The bridge dropped or the device was unlinked.
    SessionEnded { reason: String },
}

pub struct EventRouter {
    ctx: AppContext,
    filters: FilterChain,
}

impl EventRouter {
    /// Router with the standard filter chain for `ctx.started_at`.
    pub fn new(ctx: AppContext) -> Self {
        let filters = FilterChain::standard(ctx.started_at);
        Self { ctx, filters }
    }

    pub fn with_filters(ctx: AppContext, filters: FilterChain) -> Self {
        Self { ctx, filters }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Handle one event to completion.
    pub async fn handle_event(&self, event: InboundEvent) -> RouteOutcome {
        match event {
            InboundEvent::Message(msg) => self.handle_message(&msg).await,
            InboundEvent::Connected { jid } => {
                info!(jid = jid.as_deref().unwrap_or("?"), "whatsapp connected");
                RouteOutcome::Skipped
            }
            InboundEvent::Disconnected { reason } => {
                error!(reason = %reason, "whatsapp connection lost");
                RouteOutcome::SessionEnded { reason }
            }
            InboundEvent::LoggedOut { reason } => {
                error!(
                    reason = %reason,
                    "whatsapp session logged out, restart to scan a new QR code"
                );
                RouteOutcome::SessionEnded { reason }
            }
        }
    }

    /// Filter, parse, relay and reply for a single message.
    pub async fn handle_message(&self, msg: &MessageEvent) -> RouteOutcome {
        if let Some(reason) = self.filters.check(msg) {
            debug!(id = %msg.id, reason = %reason, "message dropped");
            return RouteOutcome::Dropped(reason);
        }

        let Some(command) = parse_task_command(msg.body.trim()) else {
            debug!(id = %msg.id, body = %truncate_string(&msg.body, 80), "not a task command");
            return RouteOutcome::Ignored;
        };

        info!(
            sender = %msg.sender,
            task = %command.summary(),
            sink = self.ctx.sink.display_name(),
            "relaying task"
        );
        let outcome = self.ctx.sink.submit(&command).await;

        let reply = ReplyMessage::for_outcome(
            self.ctx.notifier.owner(),
            msg.display_name(),
            &outcome,
        );
        self.ctx.notifier.send(&reply).await;

        RouteOutcome::Relayed(outcome)
    }

    /// Consume the bus until the session ends or every sender is gone.
    ///
    /// Messages are handled on spawned tasks; other events inline. In-flight
    /// tasks are not awaited when the loop ends.
    pub async fn run(self: Arc<Self>, bus: Arc<EventBus>) -> RouterExit {
        info!("event router started, waiting for messages");
        while let Some(event) = bus.consume().await {
            debug!(kind = event.kind(), "received event");
            match event {
                InboundEvent::Message(msg) => {
                    let router = Arc::clone(&self);
                    tokio::spawn(async move {
                        router.handle_message(&msg).await;
                    });
                }
                other => {
                    if let RouteOutcome::SessionEnded { reason } = self.handle_event(other).await {
                        return RouterExit::SessionEnded { reason };
                    }
                }
            }
        }
        info!("event bus closed, router exiting");
        RouterExit::BusClosed
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
