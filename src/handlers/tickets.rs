//! Ticket-facing endpoints: booking verification (the QR target) and the
//! out-of-band asset repair path.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::handlers::webhooks::confirmation::issue_assets;
use crate::models::BookingStatus;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/tickets/verify/:code", get(verify_ticket))
        .route("/bookings/:code/regenerate-assets", post(regenerate_assets))
}

async fn health() -> &'static str {
    "OK"
}

/// Booking facts shown when a ticket's scannable code is checked at the door.
#[derive(Debug, Serialize)]
pub struct TicketVerification {
    pub code: String,
    pub status: BookingStatus,
    pub quantity: i64,
    pub event_title: String,
    pub event_starts_at: i64,
    pub venue: String,
}

/// GET /tickets/verify/:code - the verification URL embedded in the QR code.
pub async fn verify_ticket(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<TicketVerification>> {
    let conn = state.db.get()?;
    let details = queries::get_booking_by_code(&conn, &code)?
        .ok_or_else(|| AppError::NotFound(format!("No booking with code {}", code)))?;

    Ok(Json(TicketVerification {
        code: details.booking.code,
        status: details.booking.status,
        quantity: details.booking.quantity,
        event_title: details.event.title,
        event_starts_at: details.event.starts_at,
        venue: details.event.venue,
    }))
}

#[derive(Debug, Serialize)]
pub struct RegeneratedAssets {
    pub code: String,
    pub ticket_url: String,
}

/// POST /bookings/:code/regenerate-assets - repair path for a booking left
/// confirmed-and-paid but without assets by an earlier generation failure.
pub async fn regenerate_assets(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<RegeneratedAssets>> {
    let details = {
        let conn = state.db.get()?;
        queries::get_booking_by_code(&conn, &code)?
            .ok_or_else(|| AppError::NotFound(format!("No booking with code {}", code)))?
    };

    if details.booking.status != BookingStatus::Confirmed {
        return Err(AppError::Conflict(format!(
            "Booking {} is {}, not confirmed",
            details.booking.code, details.booking.status
        )));
    }

    let assets = issue_assets(&state, &details).await?;

    tracing::info!(booking_code = %details.booking.code, "Ticket assets regenerated");

    Ok(Json(RegeneratedAssets {
        code: details.booking.code,
        ticket_url: assets.ticket_url,
    }))
}
