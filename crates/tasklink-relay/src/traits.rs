//! TaskSink trait: where parsed task commands end up.

use async_trait::async_trait;
use tasklink_core::types::{RelayOutcome, TaskCommand};

/// A destination that turns a `TaskCommand` into a stored record.
///
/// Implementations never propagate errors: every failure is reported as
/// `RelayOutcome::Failure` so the sender can be told about it.
#[async_trait]
pub trait TaskSink: Send + Sync {
    /// Create one record for `command`.
    async fn submit(&self, command: &TaskCommand) -> RelayOutcome;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
