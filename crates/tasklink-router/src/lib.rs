//! Tasklink Router: turns inbound chat messages into task records.
//!
//! This crate contains:
//! - **context**: `AppContext`, the immutable state every handler shares
//! - **filters**: the `MessageFilter` chain deciding which messages count
//! - **router**: `EventRouter`, the bus consumer driving parse → relay → reply

pub mod context;
pub mod filters;
pub mod router;

pub use context::AppContext;
pub use filters::{DropReason, FilterChain, MessageFilter};
pub use router::{EventRouter, RouteOutcome, RouterExit};
