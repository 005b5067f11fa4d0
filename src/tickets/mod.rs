//! Ticket asset generation: scannable verification codes and printable
//! ticket documents. Both generators are pure functions of their inputs.

pub mod pdf;
pub mod qr;

pub use pdf::TicketInput;
pub use qr::ScannableCode;

/// Compose the verification URL a ticket's scannable code points at.
pub fn verification_url(base_url: &str, booking_code: &str) -> String {
    format!(
        "{}/tickets/verify/{}",
        base_url.trim_end_matches('/'),
        booking_code
    )
}
