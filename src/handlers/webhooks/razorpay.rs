//! Inbound payment webhook: signature gate, event routing, booking lookup.
//!
//! The raw body bytes are hashed for signature verification before any
//! parsing - a re-serialized JSON form is a different value and would break
//! legitimate signatures.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::db::{queries, AppState};
use crate::payments::{RazorpayClient, WebhookEnvelope};

use super::confirmation::{process_capture, CaptureDetails};
use super::WebhookResult;

const SIGNATURE_HEADER: &str = "x-razorpay-signature";
const CAPTURE_EVENT: &str = "payment.captured";

fn extract_signature(headers: &HeaderMap) -> Result<String, WebhookResult> {
    headers
        .get(SIGNATURE_HEADER)
        .ok_or((StatusCode::BAD_REQUEST, "Missing signature header"))?
        .to_str()
        .map(|s| s.to_string())
        .map_err(|e| {
            tracing::debug!("Invalid UTF-8 in signature header: {}", e);
            (StatusCode::BAD_REQUEST, "Invalid signature header")
        })
}

/// Routed webhook event.
enum WebhookEvent {
    /// A capture notification to run the confirmation workflow for
    Captured(CaptureDetails),
    /// Anything else: acknowledged without processing so the provider stops
    /// retrying a payload that retries cannot fix
    Ignored(&'static str),
}

fn parse_event(body: &Bytes) -> WebhookEvent {
    let envelope: WebhookEnvelope = match serde_json::from_slice(body) {
        Ok(e) => e,
        Err(e) => {
            tracing::warn!("Malformed webhook payload: {}", e);
            return WebhookEvent::Ignored("Malformed payload");
        }
    };

    if envelope.event != CAPTURE_EVENT {
        return WebhookEvent::Ignored("Event ignored");
    }

    let Some(payload) = envelope.payload else {
        tracing::warn!("Capture event without a payment entity");
        return WebhookEvent::Ignored("Malformed payload");
    };

    let entity = payload.payment.entity;
    let booking_code = entity.booking_code().map(|s| s.to_string());
    WebhookEvent::Captured(CaptureDetails {
        booking_code,
        amount_minor: entity.amount,
        provider_payment_id: entity.id,
        status: entity.status,
    })
}

/// Axum handler for the payment provider webhook.
pub async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResult {
    let signature = match extract_signature(&headers) {
        Ok(s) => s,
        Err(e) => return e,
    };

    let client = RazorpayClient::new(&state.webhook_secret);
    match client.verify_webhook_signature(&body, &signature) {
        Ok(true) => {}
        Ok(false) => return (StatusCode::BAD_REQUEST, "Invalid signature"),
        Err(e) => {
            tracing::error!("Signature verification error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Signature verification failed",
            );
        }
    }

    let capture = match parse_event(&body) {
        WebhookEvent::Captured(c) => c,
        WebhookEvent::Ignored(reason) => return (StatusCode::OK, reason),
    };

    // A payload without a booking reference is unrecoverable - acknowledge so
    // the provider stops retrying, and leave the rest to manual reconciliation.
    let Some(code) = capture.booking_code.clone() else {
        tracing::warn!(
            provider_payment_id = %capture.provider_payment_id,
            "Capture notification without booking reference, acknowledging"
        );
        return (StatusCode::OK, "Missing booking reference");
    };

    let details = {
        let conn = match state.db.get() {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("DB connection error: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Database error");
            }
        };

        match queries::get_booking_by_code(&conn, &code) {
            Ok(Some(d)) => d,
            Ok(None) => {
                // Distinct from the missing-reference case: the checkout
                // write may not have committed yet, so a retry can succeed.
                tracing::warn!(
                    booking_code = %code,
                    provider_payment_id = %capture.provider_payment_id,
                    "No booking for capture notification, signalling retry"
                );
                return (StatusCode::NOT_FOUND, "Booking not found");
            }
            Err(e) => {
                tracing::error!("DB error: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Database error");
            }
        }
    };

    process_capture(&state, &details, &capture).await
}
