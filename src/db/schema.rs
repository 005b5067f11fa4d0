use rusqlite::Connection;

/// Initialize the database schema
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Events (owned by the organizer-facing system; read-only here)
        CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            venue TEXT NOT NULL,
            starts_at INTEGER NOT NULL,
            organizer TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        -- Ticket tiers per event
        CREATE TABLE IF NOT EXISTS ticket_types (
            id TEXT PRIMARY KEY,
            event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            price REAL NOT NULL,
            quota INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_ticket_types_event ON ticket_types(event_id);

        -- Attendees (email nullable - guest bookings and opted-out users)
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            created_at INTEGER NOT NULL
        );

        -- Bookings. `code` is the external human-readable identifier carried
        -- in provider webhook notes. Asset columns are filled by the capture
        -- workflow after confirmation.
        CREATE TABLE IF NOT EXISTS bookings (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            event_id TEXT NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            ticket_type_id TEXT NOT NULL REFERENCES ticket_types(id) ON DELETE CASCADE,
            user_id TEXT REFERENCES users(id) ON DELETE SET NULL,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            status TEXT NOT NULL CHECK (status IN ('pending', 'confirmed', 'cancelled')),
            qr_code TEXT,
            ticket_url TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_bookings_code ON bookings(code);
        CREATE INDEX IF NOT EXISTS idx_bookings_event ON bookings(event_id);

        -- Payments: append-only. The unique index makes duplicate capture
        -- notifications (provider at-least-once delivery) a no-op instead of
        -- a double credit.
        CREATE TABLE IF NOT EXISTS payments (
            id TEXT PRIMARY KEY,
            booking_id TEXT NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
            amount REAL NOT NULL,
            provider TEXT NOT NULL,
            provider_payment_id TEXT NOT NULL,
            status TEXT NOT NULL,
            created_at INTEGER NOT NULL,

            UNIQUE(provider, provider_payment_id)
        );
        CREATE INDEX IF NOT EXISTS idx_payments_booking ON payments(booking_id);
        "#,
    )
}
