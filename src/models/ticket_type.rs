use serde::{Deserialize, Serialize};

/// A ticket tier for an event (e.g., "General", "VIP"). Read-only input to
/// the capture workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketType {
    pub id: String,
    pub event_id: String,
    pub name: String,
    /// Unit price in major currency units
    pub price: f64,
    pub quota: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicketType {
    pub name: String,
    pub price: f64,
    pub quota: i64,
}
