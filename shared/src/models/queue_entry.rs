//! Queue Entry Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Queue entry status (等位状态)
///
/// Lifecycle: WAITING → NOTIFIED → SEATED, or → CANCELLED.
/// Transitions are staff-driven and last-write-wins; the server does not
/// reject out-of-order transitions, only unknown status strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    #[default]
    Waiting,
    Notified,
    Seated,
    Cancelled,
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "WAITING"),
            Self::Notified => write!(f, "NOTIFIED"),
            Self::Seated => write!(f, "SEATED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Queue entry entity (客户等位记录)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Record ID ("queue_entry:xxx")
    pub id: String,
    pub customer_name: String,
    pub phone_number: String,
    pub party_size: i32,
    pub status: QueueStatus,
    /// Ordinal among waiting entries, assigned at join time, never renumbered
    pub position: i32,
    /// Estimated wait in minutes (position × per-party constant)
    pub estimated_wait_time: i32,
    /// Unix millis
    pub created_at: i64,
}

/// Join queue payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntryCreate {
    pub customer_name: String,
    pub phone_number: String,
    pub party_size: i32,
}

/// Update queue status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueStatusUpdate {
    pub status: QueueStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&QueueStatus::Waiting).unwrap();
        assert_eq!(json, "\"WAITING\"");

        let parsed: QueueStatus = serde_json::from_str("\"SEATED\"").unwrap();
        assert_eq!(parsed, QueueStatus::Seated);

        // Unknown strings are a deserialization error, not a silent default
        assert!(serde_json::from_str::<QueueStatus>("\"EATING\"").is_err());
    }

    #[test]
    fn test_entry_roundtrip() {
        let entry = QueueEntry {
            id: "queue_entry:abc".to_string(),
            customer_name: "Alice".to_string(),
            phone_number: "555-0001".to_string(),
            party_size: 2,
            status: QueueStatus::Waiting,
            position: 1,
            estimated_wait_time: 15,
            created_at: 1_700_000_000_000,
        };

        let json = serde_json::to_string(&entry).unwrap();
        let back: QueueEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.position, 1);
        assert_eq!(back.status, QueueStatus::Waiting);
    }
}
