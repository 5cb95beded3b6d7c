use std::any::Any;
use std::sync::Arc;

use axum::{
    http::Uri,
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Extension, Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

use crate::controllers;
use crate::error::AppError;
use crate::AppState;

/// Messaggio del 404 in base allo scope del path richiesto.
pub fn not_found_message(path: &str) -> &'static str {
    let under = |prefix: &str| path == prefix || path.starts_with(&format!("{prefix}/"));
    if under("/auth") {
        "Auth route not found"
    } else if under("/notes") {
        "Notes route not found."
    } else {
        "Not found."
    }
}

/// Terminale per path sconosciuti e per metodi non previsti su path noti (404, mai 405).
async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(not_found_message(uri.path()))
}

// un panic in un handler diventa un 500 generico, senza dettagli verso il client
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!("handler panicked: {detail}");
    AppError::internal().into_response()
}

// stessi handler per `/notes/` e `/notes/*id`: il wildcard non accetta una coda vuota
fn note_by_id() -> MethodRouter {
    get(controllers::get_note)
        .patch(controllers::update_note)
        .delete(controllers::delete_note)
        .fallback(not_found)
}

/// Tabella delle rotte. Tutto quello che inizia con `/notes/` arriva agli handler per id.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(controllers::index).fallback(not_found))
        .route("/auth/signup", post(controllers::signup).fallback(not_found))
        .route("/auth/signin", post(controllers::signin).fallback(not_found))
        .route("/auth/me", get(controllers::me).fallback(not_found))
        .route("/auth/signout", get(controllers::signout).fallback(not_found))
        .route(
            "/notes",
            get(controllers::get_notes)
                .post(controllers::add_note)
                .fallback(not_found),
        )
        .route("/notes/", note_by_id())
        .route("/notes/*id", note_by_id())
        .fallback(not_found)
        .layer(Extension(state))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}
