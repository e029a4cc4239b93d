//! Inbound event bus: events flowing from the live connection to the router.

pub mod queue;
pub mod types;

pub use queue::EventBus;
pub use types::{InboundEvent, MessageEvent};
