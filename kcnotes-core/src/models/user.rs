use serde::{Deserialize, Serialize};

/// Utente esposto sul wire. L'hash della password non lascia mai il server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: String, // RFC3339 UTC
}
