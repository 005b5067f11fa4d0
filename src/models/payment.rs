use serde::{Deserialize, Serialize};

/// An immutable record of a captured payment.
///
/// Amounts are stored in major currency units (the provider reports minor
/// units; conversion happens before the record is built). One row per
/// provider payment id - `(provider, provider_payment_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub booking_id: String,
    pub amount: f64,
    pub provider: String,
    pub provider_payment_id: String,
    /// Provider-reported status string (e.g., "captured")
    pub status: String,
    pub created_at: i64,
}

/// Data required to record a new payment
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayment {
    pub booking_id: String,
    pub amount: f64,
    pub provider: String,
    pub provider_payment_id: String,
    pub status: String,
}
