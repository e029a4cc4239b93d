//! Tasklink Core: the pieces every other crate builds on.
//!
//! - **bus**: `InboundEvent` and the `EventBus` carrying them from the live
//!   connection to the router
//! - **command**: the `Task ... | ... ` grammar parser
//! - **config**: schema, loader and env overrides
//! - **session**: durable pairing credentials (`SessionStore`)
//! - **types**: `TaskCommand`, `RelayOutcome`, `ReplyMessage`

pub mod bus;
pub mod command;
pub mod config;
pub mod session;
pub mod types;
pub mod utils;

pub use command::parse_task_command;
pub use types::{RelayOutcome, ReplyMessage, TaskCommand};
