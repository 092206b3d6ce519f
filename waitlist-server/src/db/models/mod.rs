//! Database row models
//!
//! SurrealDB row types with `RecordId` ids. Wire-facing shapes shared with
//! clients live in `shared::models`; the two stay field-compatible through
//! the `serde_helpers` RecordId ⇄ "table:id" string conversion.

pub mod queue_entry;
pub mod serde_helpers;

// Re-exports
pub use queue_entry::*;
