use serde::{Deserialize, Serialize};

/// An event attendees can book tickets for. Read-only input to the capture
/// workflow - owned by the organizer-facing part of the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub venue: String,
    /// Event start as a Unix timestamp
    pub starts_at: i64,
    pub organizer: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub title: String,
    pub venue: String,
    pub starts_at: i64,
    pub organizer: String,
}
