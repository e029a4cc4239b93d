//! Message filters: which inbound messages are candidates for parsing.
//!
//! Filters run in order and the first one that objects wins. A dropped
//! message produces no reply and no log above debug.

use std::fmt;

use chrono::{DateTime, Utc};

use tasklink_core::bus::types::MessageEvent;

/// Why a message was dropped before parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// Sent by our own account.
    FromSelf,
    /// No text, or only whitespace.
    EmptyBody,
    /// Sent before this process started (history replay).
    BeforeStart,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DropReason::FromSelf => "from_self",
            DropReason::EmptyBody => "empty_body",
            DropReason::BeforeStart => "before_start",
        };
        f.write_str(s)
    }
}

/// A single predicate over inbound messages.
pub trait MessageFilter: Send + Sync {
    /// `Some(reason)` to drop the message, `None` to let it through.
    fn check(&self, msg: &MessageEvent) -> Option<DropReason>;
}

/// Drops messages our own account sent.
pub struct FromSelf;

impl MessageFilter for FromSelf {
    fn check(&self, msg: &MessageEvent) -> Option<DropReason> {
        msg.from_me.then_some(DropReason::FromSelf)
    }
}

/// Drops messages without text.
pub struct EmptyBody;

impl MessageFilter for EmptyBody {
    fn check(&self, msg: &MessageEvent) -> Option<DropReason> {
        msg.body.trim().is_empty().then_some(DropReason::EmptyBody)
    }
}

/// Drops messages timestamped strictly before `started_at`.
pub struct BeforeStart {
    pub started_at: DateTime<Utc>,
}

impl MessageFilter for BeforeStart {
    fn check(&self, msg: &MessageEvent) -> Option<DropReason> {
        (msg.timestamp < self.started_at).then_some(DropReason::BeforeStart)
    }
}

/// Ordered list of filters.
#[derive(Default)]
pub struct FilterChain {
    filters: Vec<Box<dyn MessageFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain the gateway runs: self, empty, then history.
    pub fn standard(started_at: DateTime<Utc>) -> Self {
        Self::new()
            .with(FromSelf)
            .with(EmptyBody)
            .with(BeforeStart { started_at })
    }

    /// Append a filter.
    pub fn with(mut self, filter: impl MessageFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// First objection, if any.
    pub fn check(&self, msg: &MessageEvent) -> Option<DropReason> {
        self.filters.iter().find_map(|f| f.check(msg))
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
