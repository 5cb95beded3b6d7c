use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AppError;

pub const INVALID_BODY: &str = "Invalid JSON body.";
pub const INVALID_NOTE_ID: &str = "Invalid note id.";
const NOTES_PREFIX: &str = "/notes/";

/// Body JSON letto per intero e poi decodificato.
///
/// A differenza di `axum::Json` non guarda il Content-Type, e ogni errore di lettura o di
/// parsing diventa un 400 con l'envelope standard.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            debug!("failed to read request body: {e}");
            AppError::bad_request(INVALID_BODY)
        })?;
        serde_json::from_slice(&bytes).map(JsonBody).map_err(|e| {
            debug!("malformed JSON body: {e}");
            AppError::bad_request(INVALID_BODY)
        })
    }
}

/// Id della nota preso da tutto quello che segue `/notes/` nel path grezzo.
///
/// Il path non viene decodificato: un id valido è fatto solo di cifre, quindi qualsiasi
/// escape `%..` o segmento aggiuntivo finisce in un 400 con l'envelope standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteId(pub i64);

pub fn parse_note_id(rest: &str) -> Result<i64, AppError> {
    // solo cifre: `parse` accetterebbe anche un `+` iniziale
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::bad_request(INVALID_NOTE_ID));
    }
    match rest.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::bad_request(INVALID_NOTE_ID)),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for NoteId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let rest = parts
            .uri
            .path()
            .strip_prefix(NOTES_PREFIX)
            .ok_or_else(|| AppError::bad_request(INVALID_NOTE_ID))?;
        parse_note_id(rest).map(NoteId)
    }
}
