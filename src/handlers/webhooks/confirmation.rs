//! The capture workflow: payment record + booking confirmation (atomic),
//! ticket asset issuance, attendee notification.
//!
//! Stages are strictly sequential. The payment/confirmation transaction must
//! commit before any asset work - no ticket is ever generated for a booking
//! not recorded as paid. Notification is the lowest-priority stage and never
//! unwinds anything.

use axum::http::StatusCode;

use crate::db::{queries, AppState};
use crate::email::{EmailAttachment, OutgoingEmail};
use crate::error::Result;
use crate::models::{BookingDetails, CreatePayment};
use crate::payments::{to_major_units, PROVIDER_NAME};
use crate::tickets::{self, pdf, qr};

/// Result type for webhook operations.
pub type WebhookResult = (StatusCode, &'static str);

/// Fields extracted from a capture notification.
#[derive(Debug, Clone)]
pub struct CaptureDetails {
    /// Booking code from the provider notes, when present
    pub booking_code: Option<String>,
    /// Amount in minor currency units as reported by the provider
    pub amount_minor: i64,
    pub provider_payment_id: String,
    /// Provider-reported status string
    pub status: String,
}

/// Run the confirmation workflow for a located booking.
pub async fn process_capture(
    state: &AppState,
    details: &BookingDetails,
    capture: &CaptureDetails,
) -> WebhookResult {
    let booking = &details.booking;
    let amount = to_major_units(capture.amount_minor);

    // 1. Record the payment and confirm the booking atomically. The unique
    //    payment insert doubles as the replay guard: a duplicate delivery
    //    short-circuits here, before any downstream side effect re-fires.
    {
        let mut conn = match state.db.get() {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("DB connection error: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Database error");
            }
        };

        let tx = match conn.transaction() {
            Ok(tx) => tx,
            Err(e) => {
                tracing::error!("Failed to start transaction: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Database error");
            }
        };

        match queries::try_record_payment(
            &tx,
            &CreatePayment {
                booking_id: booking.id.clone(),
                amount,
                provider: PROVIDER_NAME.to_string(),
                provider_payment_id: capture.provider_payment_id.clone(),
                status: capture.status.clone(),
            },
        ) {
            Ok(Some(_)) => {}
            Ok(None) => {
                // No need to commit - nothing was written
                return (StatusCode::OK, "Already processed");
            }
            Err(e) => {
                tracing::error!(
                    booking_code = %booking.code,
                    provider_payment_id = %capture.provider_payment_id,
                    "Failed to record payment: {}", e
                );
                return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to record payment");
            }
        }

        // CAS returning false means the booking was already confirmed by an
        // earlier payment - same final state, not an error.
        if let Err(e) = queries::confirm_booking(&tx, &booking.id) {
            tracing::error!(
                booking_code = %booking.code,
                provider_payment_id = %capture.provider_payment_id,
                "Failed to confirm booking: {}", e
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to confirm booking");
        }

        if let Err(e) = tx.commit() {
            tracing::error!("Failed to commit transaction: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Database error");
        }
    }

    tracing::info!(
        booking_code = %booking.code,
        provider_payment_id = %capture.provider_payment_id,
        amount,
        "Payment recorded, booking confirmed"
    );

    // 2. Issue ticket assets. A failure here leaves a confirmed, paid booking
    //    without assets - recoverable through the regenerate-assets endpoint,
    //    so report it to the provider rather than swallowing it.
    let assets = match issue_assets(state, details).await {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(
                booking_code = %booking.code,
                provider_payment_id = %capture.provider_payment_id,
                "Asset generation failed after payment commit: {}", e
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, "Asset generation failed");
        }
    };

    // 3. Notify the attendee. Never unwinds prior steps.
    notify_attendee(state, details, &assets).await;

    (StatusCode::OK, "OK")
}

/// Ticket assets produced for a confirmed booking.
pub struct IssuedAssets {
    pub qr_data_url: String,
    pub pdf: Vec<u8>,
    pub ticket_url: String,
}

/// Generate the scannable code and ticket document, persist the document to
/// object storage, and record both asset locations on the booking.
///
/// Also the repair path: safe to re-run for a confirmed booking whose
/// earlier asset generation failed.
pub async fn issue_assets(state: &AppState, details: &BookingDetails) -> Result<IssuedAssets> {
    let booking = &details.booking;

    let verify_url = tickets::verification_url(&state.base_url, &booking.code);
    let code = qr::generate(&verify_url)?;

    let input = pdf::TicketInput {
        booking_code: &booking.code,
        quantity: booking.quantity,
        event_title: &details.event.title,
        event_starts_at: details.event.starts_at,
        venue: &details.event.venue,
        attendee: details.user.as_ref().map(|u| u.name.as_str()),
    };
    let pdf_bytes = pdf::render(&input, &code.png)?;

    let key = format!("{}.pdf", booking.code);
    let ticket_url = state
        .store
        .put(&key, pdf_bytes.clone(), "application/pdf")
        .await?;

    let conn = state.db.get()?;
    queries::set_booking_assets(&conn, &booking.id, &code.data_url, &ticket_url)?;

    Ok(IssuedAssets {
        qr_data_url: code.data_url,
        pdf: pdf_bytes,
        ticket_url,
    })
}

/// Email the attendee the confirmation with the ticket attached.
///
/// A booking without an attendee email is a logged no-op; a send failure is
/// logged and swallowed - the booking stays confirmed and the payment stays
/// recorded either way.
async fn notify_attendee(state: &AppState, details: &BookingDetails, assets: &IssuedAssets) {
    let booking = &details.booking;

    let Some(user) = &details.user else {
        tracing::info!(booking_code = %booking.code, "Guest booking, skipping notification");
        return;
    };
    let Some(email) = user.email.as_deref() else {
        tracing::info!(
            booking_code = %booking.code,
            "Attendee has no email address, skipping notification"
        );
        return;
    };

    let verify_url = tickets::verification_url(&state.base_url, &booking.code);
    let message = OutgoingEmail {
        to: email.to_string(),
        subject: format!("Your tickets for {}", details.event.title),
        text: format!(
            "Hi {},\n\nYour booking {} for {} is confirmed ({} ticket(s)).\n\nVerify your booking anytime: {}\n\nYour ticket is attached. See you there!\n",
            user.name, booking.code, details.event.title, booking.quantity, verify_url
        ),
        attachments: vec![EmailAttachment {
            filename: format!("{}.pdf", booking.code),
            content: assets.pdf.clone(),
        }],
    };

    if let Err(e) = state.mailer.send(&message).await {
        tracing::error!(
            booking_code = %booking.code,
            "Confirmation email failed, booking remains confirmed: {}", e
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use r2d2::Pool;
    use r2d2_sqlite::SqliteConnectionManager;

    use super::*;
    use crate::db::{init_db, AppState};
    use crate::email::{MockMailer, SendOutcome};
    use crate::error::AppError;
    use crate::models::{BookingStatus, CreateBooking, CreateEvent, CreateTicketType, CreateUser};
    use crate::storage::MockObjectStore;

    fn test_state(mailer: MockMailer, store: MockObjectStore) -> AppState {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).unwrap();
        {
            let conn = pool.get().unwrap();
            init_db(&conn).unwrap();
        }
        AppState {
            db: pool,
            base_url: "http://localhost:3000".to_string(),
            webhook_secret: "test-secret".to_string(),
            mailer: Arc::new(mailer),
            store: Arc::new(store),
        }
    }

    fn seed_booking(state: &AppState, email: Option<&str>) -> BookingDetails {
        let conn = state.db.get().unwrap();
        let event = queries::create_event(
            &conn,
            &CreateEvent {
                title: "RustConf 2026".to_string(),
                venue: "Convention Centre".to_string(),
                starts_at: 1_790_000_000,
                organizer: "Rust Events Ltd".to_string(),
            },
        )
        .unwrap();
        let ticket_type = queries::create_ticket_type(
            &conn,
            &event.id,
            &CreateTicketType {
                name: "General".to_string(),
                price: 500.0,
                quota: 100,
            },
        )
        .unwrap();
        let user = queries::create_user(
            &conn,
            &CreateUser {
                name: "Asha Patel".to_string(),
                email: email.map(|e| e.to_string()),
                phone: None,
            },
        )
        .unwrap();
        let booking = queries::create_booking(
            &conn,
            &CreateBooking {
                event_id: event.id.clone(),
                ticket_type_id: ticket_type.id.clone(),
                user_id: Some(user.id.clone()),
                quantity: 3,
            },
        )
        .unwrap();
        queries::get_booking_by_code(&conn, &booking.code)
            .unwrap()
            .unwrap()
    }

    fn capture_for(details: &BookingDetails, payment_id: &str, amount_minor: i64) -> CaptureDetails {
        CaptureDetails {
            booking_code: Some(details.booking.code.clone()),
            amount_minor,
            provider_payment_id: payment_id.to_string(),
            status: "captured".to_string(),
        }
    }

    fn accepting_store() -> MockObjectStore {
        let mut store = MockObjectStore::new();
        store
            .expect_put()
            .returning(|key, _, _| Ok(format!("http://storage.local/tickets/{}", key)));
        store
    }

    #[tokio::test]
    async fn test_capture_confirms_and_notifies() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_| Ok(SendOutcome::Sent));

        let state = test_state(mailer, accepting_store());
        let details = seed_booking(&state, Some("asha@example.com"));
        let capture = capture_for(&details, "pay_unit_1", 150000);

        let result = process_capture(&state, &details, &capture).await;
        assert_eq!(result.0, StatusCode::OK);

        let conn = state.db.get().unwrap();
        let refreshed = queries::get_booking_by_code(&conn, &details.booking.code)
            .unwrap()
            .unwrap();
        assert_eq!(refreshed.booking.status, BookingStatus::Confirmed);
        assert!(refreshed.booking.qr_code.is_some());
        assert!(refreshed.booking.ticket_url.is_some());

        let payment = queries::get_payment_by_provider_id(&conn, PROVIDER_NAME, "pay_unit_1")
            .unwrap()
            .unwrap();
        assert_eq!(payment.amount, 1500.0);
    }

    #[tokio::test]
    async fn test_replay_short_circuits_before_side_effects() {
        let mut mailer = MockMailer::new();
        // One email despite two deliveries of the same notification
        mailer
            .expect_send()
            .times(1)
            .returning(|_| Ok(SendOutcome::Sent));

        let state = test_state(mailer, accepting_store());
        let details = seed_booking(&state, Some("asha@example.com"));
        let capture = capture_for(&details, "pay_replayed", 10000);

        let first = process_capture(&state, &details, &capture).await;
        assert_eq!(first, (StatusCode::OK, "OK"));

        let second = process_capture(&state, &details, &capture).await;
        assert_eq!(second, (StatusCode::OK, "Already processed"));

        let conn = state.db.get().unwrap();
        let payments = queries::list_payments_for_booking(&conn, &details.booking.id).unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount, 100.0);
    }

    #[tokio::test]
    async fn test_notification_failure_leaves_booking_confirmed() {
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_| Err(AppError::Internal("simulated network error".into())));

        let state = test_state(mailer, accepting_store());
        let details = seed_booking(&state, Some("asha@example.com"));
        let capture = capture_for(&details, "pay_mail_down", 10000);

        let result = process_capture(&state, &details, &capture).await;
        assert_eq!(result, (StatusCode::OK, "OK"));

        let conn = state.db.get().unwrap();
        let refreshed = queries::get_booking_by_code(&conn, &details.booking.code)
            .unwrap()
            .unwrap();
        assert_eq!(refreshed.booking.status, BookingStatus::Confirmed);
        assert!(
            queries::get_payment_by_provider_id(&conn, PROVIDER_NAME, "pay_mail_down")
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_attendee_without_email_skips_notification() {
        let mut mailer = MockMailer::new();
        mailer.expect_send().times(0);

        let state = test_state(mailer, accepting_store());
        let details = seed_booking(&state, None);
        let capture = capture_for(&details, "pay_no_email", 10000);

        let result = process_capture(&state, &details, &capture).await;
        assert_eq!(result, (StatusCode::OK, "OK"));
    }

    #[tokio::test]
    async fn test_storage_failure_reports_error_but_keeps_payment() {
        let mut mailer = MockMailer::new();
        mailer.expect_send().times(0);

        let mut store = MockObjectStore::new();
        store
            .expect_put()
            .returning(|_, _, _| Err(AppError::Internal("storage unavailable".into())));

        let state = test_state(mailer, store);
        let details = seed_booking(&state, Some("asha@example.com"));
        let capture = capture_for(&details, "pay_storage_down", 10000);

        let result = process_capture(&state, &details, &capture).await;
        assert_eq!(result.0, StatusCode::INTERNAL_SERVER_ERROR);

        // Payment and confirmation already committed - the regenerate-assets
        // endpoint is the repair path for this state.
        let conn = state.db.get().unwrap();
        let refreshed = queries::get_booking_by_code(&conn, &details.booking.code)
            .unwrap()
            .unwrap();
        assert_eq!(refreshed.booking.status, BookingStatus::Confirmed);
        assert!(refreshed.booking.ticket_url.is_none());
        assert!(
            queries::get_payment_by_provider_id(&conn, PROVIDER_NAME, "pay_storage_down")
                .unwrap()
                .is_some()
        );
    }
}
