mod schema;
pub mod queries;

mod from_row;

pub use schema::init_db;

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::email::Mailer;
use crate::storage::ObjectStore;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state holding the database pool, configuration, and the
/// injected external-service clients.
///
/// Clients are constructed once at startup and passed by reference here so
/// tests can substitute fakes - no hidden global singletons.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Base URL for ticket verification links (e.g., https://api.eventhive.example)
    pub base_url: String,
    /// Shared secret for webhook signature verification
    pub webhook_secret: String,
    pub mailer: Arc<dyn Mailer>,
    pub store: Arc<dyn ObjectStore>,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
