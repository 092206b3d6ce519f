//! Data models
//!
//! Shared between waitlist-server and clients (via API).
//! Server-side row types (with SurrealDB record ids) live in
//! `waitlist-server::db::models`; these are the wire-facing shapes.

pub mod queue_entry;

// Re-exports
pub use queue_entry::*;
