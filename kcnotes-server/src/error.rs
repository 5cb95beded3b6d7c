use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kcnotes_core::{Envelope, ErrorKind};
use thiserror::Error;
use tracing::{debug, error};

/// Errore restituito dagli handler. Il messaggio finisce nel campo `message`
/// dell'envelope, quindi non deve mai contenere dettagli interni.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// 401 uniforme: header mancante, malformato o token scaduto danno lo stesso messaggio.
    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized, ErrorKind::Unauthorized.default_message())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal, ErrorKind::Internal.default_message())
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.kind.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        error!("database error: {e}");
        Self::internal()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), "{}", self.message);
        } else {
            debug!(status = status.as_u16(), "{}", self.message);
        }
        (status, Json(Envelope::<()>::failure(self.message))).into_response()
    }
}
