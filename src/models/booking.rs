use serde::{Deserialize, Serialize};

use super::{Event, TicketType, User};

/// A reservation of tickets for an event.
///
/// Created pending at checkout time; advanced to confirmed only by the
/// payment-capture workflow. `code` is the externally-facing human-readable
/// identifier carried in provider webhook notes and shown to attendees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub code: String,
    pub event_id: String,
    pub ticket_type_id: String,
    /// Guest bookings have no user
    pub user_id: Option<String>,
    pub quantity: i64,
    pub status: BookingStatus,
    /// Scannable verification code, stored inline as a PNG data URL
    pub qr_code: Option<String>,
    /// Durable object-storage URL of the generated ticket document
    pub ticket_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data required to create a new booking (checkout time, outside the
/// capture workflow)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBooking {
    pub event_id: String,
    pub ticket_type_id: String,
    pub user_id: Option<String>,
    pub quantity: i64,
}

/// Booking lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A booking with its associated entities eagerly loaded.
///
/// The capture workflow needs all of these to compose the ticket document
/// and the notification text, so the locator fetches them together.
#[derive(Debug, Clone)]
pub struct BookingDetails {
    pub booking: Booking,
    pub event: Event,
    pub ticket_type: TicketType,
    pub user: Option<User>,
}
