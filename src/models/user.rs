use serde::{Deserialize, Serialize};

/// An attendee. Read-only input to the capture workflow; email is optional
/// and its absence makes notification a skipped no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}
