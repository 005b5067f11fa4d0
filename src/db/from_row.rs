//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on invalid database contents.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const EVENT_COLS: &str = "id, title, venue, starts_at, organizer, created_at";

pub const TICKET_TYPE_COLS: &str = "id, event_id, name, price, quota, created_at";

pub const USER_COLS: &str = "id, name, email, phone, created_at";

pub const BOOKING_COLS: &str = "id, code, event_id, ticket_type_id, user_id, quantity, status, qr_code, ticket_url, created_at, updated_at";

pub const PAYMENT_COLS: &str =
    "id, booking_id, amount, provider, provider_payment_id, status, created_at";

// ============ FromRow Implementations ============

impl FromRow for Event {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Event {
            id: row.get(0)?,
            title: row.get(1)?,
            venue: row.get(2)?,
            starts_at: row.get(3)?,
            organizer: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl FromRow for TicketType {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(TicketType {
            id: row.get(0)?,
            event_id: row.get(1)?,
            name: row.get(2)?,
            price: row.get(3)?,
            quota: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl FromRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl FromRow for Booking {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Booking {
            id: row.get(0)?,
            code: row.get(1)?,
            event_id: row.get(2)?,
            ticket_type_id: row.get(3)?,
            user_id: row.get(4)?,
            quantity: row.get(5)?,
            status: parse_enum(row, 6, "status")?,
            qr_code: row.get(7)?,
            ticket_url: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

impl FromRow for Payment {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Payment {
            id: row.get(0)?,
            booking_id: row.get(1)?,
            amount: row.get(2)?,
            provider: row.get(3)?,
            provider_payment_id: row.get(4)?,
            status: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}
