use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// Proprietario della nota (users.id)
    pub user_id: i64,
    pub created_at: String, // RFC3339 UTC
}
