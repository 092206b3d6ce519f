//! Shared types for the Waitlist system
//!
//! Common types used by both the server and clients: the queue entry
//! model, message bus wire types and small utilities.

pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, EventType};

// Model re-exports
pub use models::{QueueEntry, QueueEntryCreate, QueueStatus, QueueStatusUpdate};
