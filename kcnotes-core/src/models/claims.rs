use serde::{Deserialize, Serialize};

/// Payload di un bearer token. Non viene mai persistito: esiste solo dentro il token firmato.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// users.id del proprietario del token
    pub id: i64,
    pub username: String,
    /// Issued-at (Unix timestamp, secondi)
    pub iat: i64,
    /// Scadenza (Unix timestamp, secondi)
    pub exp: i64,
}

impl Claims {
    /// Claims per `id`/`username` emessi a `now` e validi per `ttl_secs` secondi.
    pub fn new(id: i64, username: impl Into<String>, now: i64, ttl_secs: i64) -> Self {
        Self {
            id,
            username: username.into(),
            iat: now,
            exp: now + ttl_secs,
        }
    }
}
