//! Task relay layer for Tasklink.
//!
//! # Architecture
//!
//! - [`traits::TaskSink`]: trait every record destination implements
//! - [`airtable::AirtableSink`]: Airtable REST client creating one record per task

pub mod airtable;
pub mod traits;

pub use airtable::AirtableSink;
pub use traits::TaskSink;
