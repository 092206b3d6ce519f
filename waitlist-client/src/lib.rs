//! Waitlist Client - HTTP + message bus client for the Waitlist Server
//!
//! Provides network-based HTTP calls to the Waitlist Server API and a
//! push-only subscription to its invalidation signal bus. The two views
//! (public join view, staff management view) are thin console programs
//! built on this crate — see `examples/`.

pub mod error;
pub mod http;
pub mod message;

pub use error::{ClientError, ClientResult};
pub use http::HttpClient;

// Re-export shared types for convenience
pub use shared::models::{QueueEntry, QueueEntryCreate, QueueStatus, QueueStatusUpdate};

// Message types and clients
pub use message::{BusMessage, EventType, MessageClient, MessageError};
