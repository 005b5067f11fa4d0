use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, Image, ImageTransform, Mm, PdfDocument};

use crate::error::{AppError, Result};

/// Facts printed on a ticket document. Only booking/event facts - no prices
/// and no recomputed totals.
#[derive(Debug, Clone)]
pub struct TicketInput<'a> {
    pub booking_code: &'a str,
    pub quantity: i64,
    pub event_title: &'a str,
    /// Event start as a Unix timestamp
    pub event_starts_at: i64,
    pub venue: &'a str,
    /// Attendee display name; guest bookings have none
    pub attendee: Option<&'a str>,
}

/// Format a Unix timestamp as a human-readable date (e.g., "Jan 15, 2026 19:30")
fn format_date(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%b %d, %Y %H:%M").to_string())
        .unwrap_or_else(|| "Unknown date".to_string())
}

/// Compose a single-page A4 ticket with the scannable code embedded inline.
///
/// Returns only once the document is fully serialized - the byte buffer is
/// complete and valid when this function returns, never a partially-written
/// stream.
pub fn render(input: &TicketInput<'_>, qr_png: &[u8]) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new("EventHive Ticket", Mm(210.0), Mm(297.0), "ticket");
    let layer = doc.get_page(page).get_layer(layer);

    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Internal(format!("PDF font error: {}", e)))?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Internal(format!("PDF font error: {}", e)))?;

    // Title block
    layer.use_text("EventHive Ticket", 28.0, Mm(20.0), Mm(265.0), &bold);

    // Event facts
    layer.use_text(input.event_title, 20.0, Mm(20.0), Mm(243.0), &bold);
    layer.use_text(format_date(input.event_starts_at), 12.0, Mm(20.0), Mm(234.0), &regular);
    layer.use_text(input.venue, 12.0, Mm(20.0), Mm(227.0), &regular);

    // Booking facts
    let attendee = input.attendee.unwrap_or("Guest");
    layer.use_text(format!("Attendee: {}", attendee), 12.0, Mm(20.0), Mm(211.0), &regular);
    layer.use_text(
        format!("Booking code: {}", input.booking_code),
        14.0,
        Mm(20.0),
        Mm(202.0),
        &bold,
    );
    layer.use_text(format!("Quantity: {}", input.quantity), 12.0, Mm(20.0), Mm(193.0), &regular);

    // Scannable code, bottom-left, with a caption
    let qr = printpdf::image_crate::load_from_memory(qr_png)
        .map_err(|e| AppError::Internal(format!("PDF image error: {}", e)))?;
    let image = Image::from_dynamic_image(&qr);
    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(20.0)),
            translate_y: Some(Mm(110.0)),
            dpi: Some(150.0),
            ..Default::default()
        },
    );
    layer.use_text("Scan to verify this booking", 10.0, Mm(20.0), Mm(103.0), &regular);

    doc.save_to_bytes()
        .map_err(|e| AppError::Internal(format!("PDF serialization error: {}", e)))
}
