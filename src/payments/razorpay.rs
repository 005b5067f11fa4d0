use std::collections::HashMap;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Provider name for logging and payment records
pub const PROVIDER_NAME: &str = "razorpay";

/// Convert a provider-reported amount in minor currency units (paise) to
/// major units (rupees).
pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / 100.0
}

#[derive(Debug, Clone)]
pub struct RazorpayClient {
    webhook_secret: String,
}

impl RazorpayClient {
    pub fn new(webhook_secret: &str) -> Self {
        Self {
            webhook_secret: webhook_secret.to_string(),
        }
    }

    /// Verify a webhook signature: lowercase-hex HMAC-SHA256 over the raw
    /// request body. The raw bytes must be used - re-serialized JSON is a
    /// different value and breaks legitimate signatures.
    pub fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<bool> {
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| AppError::Internal("Invalid webhook secret".into()))?;
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());

        // Constant-time comparison to prevent timing attacks.
        let expected_bytes = expected.as_bytes();
        let provided_bytes = signature.as_bytes();

        // Length check is not constant-time, but signature length is not
        // secret (always 64 hex chars for SHA-256)
        if expected_bytes.len() != provided_bytes.len() {
            return Ok(false);
        }

        Ok(expected_bytes.ct_eq(provided_bytes).into())
    }
}

/// Webhook envelope: an event-type field plus a nested payment entity.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub payload: Option<WebhookPayload>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub payment: PaymentWrapper,
}

#[derive(Debug, Deserialize)]
pub struct PaymentWrapper {
    pub entity: CapturedPayment,
}

/// The payment entity inside a capture notification.
#[derive(Debug, Deserialize)]
pub struct CapturedPayment {
    pub id: String,
    /// Amount in minor currency units (paise)
    pub amount: i64,
    pub status: String,
    /// Free-form notes mapping set at order-creation time; the booking code
    /// is expected under "bookingId"
    #[serde(default)]
    pub notes: HashMap<String, serde_json::Value>,
}

impl CapturedPayment {
    /// Extract the booking code from the notes mapping, if present.
    pub fn booking_code(&self) -> Option<&str> {
        self.notes.get("bookingId").and_then(|v| v.as_str())
    }
}
