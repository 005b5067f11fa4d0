//! Test utilities and fixtures for EventHive integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::async_trait;
use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

// Re-export the main library crate
pub use eventhive::db::{init_db, queries, AppState};
pub use eventhive::email::{Mailer, OutgoingEmail, SendOutcome};
pub use eventhive::error::{AppError, Result};
pub use eventhive::models::*;
pub use eventhive::storage::ObjectStore;

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test123secret456";

/// Mailer fake that records every message and can be switched to fail.
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every subsequent send fail with a simulated network error.
    pub fn fail_sends(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn sent_messages(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<SendOutcome> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated network error".into()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(SendOutcome::Sent)
    }
}

/// Object store fake keeping uploads in memory.
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<String> {
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(format!("http://storage.local/tickets/{}", key))
    }
}

/// Create an in-memory test database with the schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// An AppState wired to in-memory fakes, with handles to inspect them.
pub struct TestContext {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub store: Arc<MemoryStore>,
}

pub fn create_test_context() -> TestContext {
    let manager = SqliteConnectionManager::memory();
    // One pooled connection: each connection of a memory manager would be a
    // separate database
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    let mailer = Arc::new(RecordingMailer::new());
    let store = Arc::new(MemoryStore::new());

    let state = AppState {
        db: pool,
        base_url: "http://localhost:3000".to_string(),
        webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        mailer: mailer.clone(),
        store: store.clone(),
    };

    TestContext {
        state,
        mailer,
        store,
    }
}

/// Create a Router with all endpoints, mirroring the production assembly
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(eventhive::handlers::webhooks::router())
        .merge(eventhive::handlers::tickets::router())
        .with_state(state)
}

// ============ Entity fixtures ============

pub fn create_test_event(conn: &Connection) -> Event {
    queries::create_event(
        conn,
        &CreateEvent {
            title: "RustConf 2026".to_string(),
            venue: "Convention Centre, Bengaluru".to_string(),
            starts_at: 1_790_000_000,
            organizer: "Rust Events Ltd".to_string(),
        },
    )
    .expect("Failed to create test event")
}

pub fn create_test_ticket_type(conn: &Connection, event_id: &str) -> TicketType {
    queries::create_ticket_type(
        conn,
        event_id,
        &CreateTicketType {
            name: "General".to_string(),
            price: 500.0,
            quota: 100,
        },
    )
    .expect("Failed to create test ticket type")
}

pub fn create_test_user(conn: &Connection, email: Option<&str>) -> User {
    queries::create_user(
        conn,
        &CreateUser {
            name: "Asha Patel".to_string(),
            email: email.map(|e| e.to_string()),
            phone: None,
        },
    )
    .expect("Failed to create test user")
}

pub fn create_test_booking(
    conn: &Connection,
    event_id: &str,
    ticket_type_id: &str,
    user_id: Option<&str>,
    quantity: i64,
) -> Booking {
    queries::create_booking(
        conn,
        &CreateBooking {
            event_id: event_id.to_string(),
            ticket_type_id: ticket_type_id.to_string(),
            user_id: user_id.map(|u| u.to_string()),
            quantity,
        },
    )
    .expect("Failed to create test booking")
}

/// Seed the usual event/ticket-type/attendee/pending-booking chain and return
/// the booking. The attendee gets `email` (None = no address on file).
pub fn seed_pending_booking(conn: &Connection, email: Option<&str>, quantity: i64) -> Booking {
    let event = create_test_event(conn);
    let ticket_type = create_test_ticket_type(conn, &event.id);
    let user = create_test_user(conn, email);
    create_test_booking(conn, &event.id, &ticket_type.id, Some(&user.id), quantity)
}

pub fn count_payments(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM payments", [], |row| row.get(0))
        .expect("Failed to count payments")
}

// ============ Webhook helpers ============

/// Sign a payload the way the provider does: lowercase-hex HMAC-SHA256 over
/// the raw bytes.
pub fn sign_payload(payload: &[u8], secret: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// A `payment.captured` notification. `booking_code` lands in notes under the
/// `bookingId` key (None = notes without a booking reference).
pub fn capture_payload(
    booking_code: Option<&str>,
    payment_id: &str,
    amount_minor: i64,
) -> Vec<u8> {
    let notes = match booking_code {
        Some(code) => serde_json::json!({ "bookingId": code }),
        None => serde_json::json!({}),
    };
    serde_json::json!({
        "event": "payment.captured",
        "payload": {
            "payment": {
                "entity": {
                    "id": payment_id,
                    "amount": amount_minor,
                    "status": "captured",
                    "notes": notes,
                }
            }
        }
    })
    .to_string()
    .into_bytes()
}
