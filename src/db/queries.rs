use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::*;

use super::from_row::{
    query_all, query_one, BOOKING_COLS, EVENT_COLS, PAYMENT_COLS, TICKET_TYPE_COLS, USER_COLS,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a human-readable booking code (e.g., "EH-3F9A2C41").
/// Shown to attendees and carried in provider webhook notes.
pub fn gen_booking_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("EH-{}", hex[..8].to_uppercase())
}

// ============ Events / Ticket Types / Users ============

pub fn create_event(conn: &Connection, input: &CreateEvent) -> Result<Event> {
    let event = Event {
        id: gen_id(),
        title: input.title.clone(),
        venue: input.venue.clone(),
        starts_at: input.starts_at,
        organizer: input.organizer.clone(),
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO events (id, title, venue, starts_at, organizer, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.id,
            event.title,
            event.venue,
            event.starts_at,
            event.organizer,
            event.created_at
        ],
    )?;
    Ok(event)
}

pub fn get_event_by_id(conn: &Connection, id: &str) -> Result<Option<Event>> {
    query_one(
        conn,
        &format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLS),
        &[&id],
    )
}

pub fn create_ticket_type(
    conn: &Connection,
    event_id: &str,
    input: &CreateTicketType,
) -> Result<TicketType> {
    let ticket_type = TicketType {
        id: gen_id(),
        event_id: event_id.to_string(),
        name: input.name.clone(),
        price: input.price,
        quota: input.quota,
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO ticket_types (id, event_id, name, price, quota, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            ticket_type.id,
            ticket_type.event_id,
            ticket_type.name,
            ticket_type.price,
            ticket_type.quota,
            ticket_type.created_at
        ],
    )?;
    Ok(ticket_type)
}

pub fn create_user(conn: &Connection, input: &CreateUser) -> Result<User> {
    let user = User {
        id: gen_id(),
        name: input.name.clone(),
        email: input.email.clone(),
        phone: input.phone.clone(),
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO users (id, name, email, phone, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![user.id, user.name, user.email, user.phone, user.created_at],
    )?;
    Ok(user)
}

// ============ Bookings ============

/// Create a pending booking with a fresh booking code (checkout time,
/// outside the capture workflow).
pub fn create_booking(conn: &Connection, input: &CreateBooking) -> Result<Booking> {
    let ts = now();
    let booking = Booking {
        id: gen_id(),
        code: gen_booking_code(),
        event_id: input.event_id.clone(),
        ticket_type_id: input.ticket_type_id.clone(),
        user_id: input.user_id.clone(),
        quantity: input.quantity,
        status: BookingStatus::Pending,
        qr_code: None,
        ticket_url: None,
        created_at: ts,
        updated_at: ts,
    };
    conn.execute(
        "INSERT INTO bookings (id, code, event_id, ticket_type_id, user_id, quantity, status, qr_code, ticket_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            booking.id,
            booking.code,
            booking.event_id,
            booking.ticket_type_id,
            booking.user_id,
            booking.quantity,
            booking.status.as_str(),
            booking.qr_code,
            booking.ticket_url,
            booking.created_at,
            booking.updated_at
        ],
    )?;
    Ok(booking)
}

/// Look up a booking by its external code, eagerly loading the event, ticket
/// type, and (when present) attendee the capture workflow needs downstream.
pub fn get_booking_by_code(conn: &Connection, code: &str) -> Result<Option<BookingDetails>> {
    let booking: Option<Booking> = query_one(
        conn,
        &format!("SELECT {} FROM bookings WHERE code = ?1", BOOKING_COLS),
        &[&code],
    )?;
    let Some(booking) = booking else {
        return Ok(None);
    };

    let event = get_event_by_id(conn, &booking.event_id)?.ok_or_else(|| {
        AppError::Internal(format!("booking {} references missing event", booking.code))
    })?;

    let ticket_type: TicketType = query_one(
        conn,
        &format!("SELECT {} FROM ticket_types WHERE id = ?1", TICKET_TYPE_COLS),
        &[&booking.ticket_type_id],
    )?
    .ok_or_else(|| {
        AppError::Internal(format!(
            "booking {} references missing ticket type",
            booking.code
        ))
    })?;

    let user = match &booking.user_id {
        Some(user_id) => query_one(
            conn,
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
            &[user_id],
        )?,
        None => None,
    };

    Ok(Some(BookingDetails {
        booking,
        event,
        ticket_type,
        user,
    }))
}

/// Advance a booking from pending to confirmed.
///
/// Compare-and-set keyed on the current status so concurrent deliveries for
/// the same booking cannot race - no in-process locking. Returns whether this
/// call performed the transition.
pub fn confirm_booking(conn: &Connection, booking_id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE bookings SET status = 'confirmed', updated_at = ?1 WHERE id = ?2 AND status = 'pending'",
        params![now(), booking_id],
    )?;
    Ok(affected > 0)
}

/// Record the generated assets on a booking: the QR data URL inline, the
/// ticket document as a durable object-storage URL.
pub fn set_booking_assets(
    conn: &Connection,
    booking_id: &str,
    qr_code: &str,
    ticket_url: &str,
) -> Result<()> {
    conn.execute(
        "UPDATE bookings SET qr_code = ?1, ticket_url = ?2, updated_at = ?3 WHERE id = ?4",
        params![qr_code, ticket_url, now(), booking_id],
    )?;
    Ok(())
}

// ============ Payments ============

/// Append a payment record, once per provider payment id.
///
/// `INSERT OR IGNORE` against the `UNIQUE(provider, provider_payment_id)`
/// index makes duplicate capture notifications a detectable no-op: returns
/// `None` when this provider payment id was already recorded.
pub fn try_record_payment(conn: &Connection, input: &CreatePayment) -> Result<Option<Payment>> {
    let payment = Payment {
        id: gen_id(),
        booking_id: input.booking_id.clone(),
        amount: input.amount,
        provider: input.provider.clone(),
        provider_payment_id: input.provider_payment_id.clone(),
        status: input.status.clone(),
        created_at: now(),
    };
    let affected = conn.execute(
        "INSERT OR IGNORE INTO payments (id, booking_id, amount, provider, provider_payment_id, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            payment.id,
            payment.booking_id,
            payment.amount,
            payment.provider,
            payment.provider_payment_id,
            payment.status,
            payment.created_at
        ],
    )?;
    if affected > 0 {
        Ok(Some(payment))
    } else {
        Ok(None)
    }
}

pub fn get_payment_by_provider_id(
    conn: &Connection,
    provider: &str,
    provider_payment_id: &str,
) -> Result<Option<Payment>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM payments WHERE provider = ?1 AND provider_payment_id = ?2",
            PAYMENT_COLS
        ),
        &[&provider, &provider_payment_id],
    )
}

/// All payments recorded for a booking, oldest first. Reconciliation support.
pub fn list_payments_for_booking(conn: &Connection, booking_id: &str) -> Result<Vec<Payment>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM payments WHERE booking_id = ?1 ORDER BY created_at ASC",
            PAYMENT_COLS
        ),
        &[&booking_id],
    )
}
