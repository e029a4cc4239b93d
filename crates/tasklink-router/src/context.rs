//! Shared application context.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use tasklink_channels::Notifier;
use tasklink_relay::TaskSink;

/// Everything a message handler needs, fixed at startup.
///
/// Cheap to clone; handlers running in separate tasks each hold a copy.
#[derive(Clone)]
pub struct AppContext {
    /// Process start; messages sent earlier are history, not commands.
    pub started_at: DateTime<Utc>,
    /// Where parsed tasks are recorded.
    pub sink: Arc<dyn TaskSink>,
    /// Where outcome replies go.
    pub notifier: Notifier,
}

impl AppContext {
    pub fn new(started_at: DateTime<Utc>, sink: Arc<dyn TaskSink>, notifier: Notifier) -> Self {
        Self {
            started_at,
            sink,
            notifier,
        }
    }
}
