//! Session credential persistence.
//!
//! # Disk format
//!
//! A single pretty-printed JSON document (default `./session.db`):
//! `{"jid": "...", "creds": {...}, "pairedAt": "..."}`.
//! Invalidated files are renamed to `session.db.backup.<unix-timestamp>`.

pub mod store;

pub use store::{SessionStore, SessionStoreError, StoredSession};
