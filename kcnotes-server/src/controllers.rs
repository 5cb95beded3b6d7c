use axum::{
    extract::Extension,
    http::StatusCode,
    response::Html,
    Json,
};
use kcnotes_core::{
    CreateNoteRequest, Envelope, MeResponse, NoteResponse, NotesResponse, SigninRequest,
    SignupRequest, TokenResponse, UpdateNoteRequest,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::auth::{self, AuthUser};
use crate::error::AppError;
use crate::extract::{JsonBody, NoteId};
use crate::AppState;

pub const INDEX_BODY: &str = "Hello, Kodecamp";
/// Stesso messaggio per username sconosciuto e password sbagliata.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";

type ApiResult<T> = Result<Json<Envelope<T>>, AppError>;
type CreatedResult<T> = Result<(StatusCode, Json<Envelope<T>>), AppError>;

/// Esegue hashing/verifica della password fuori dal runtime async: Argon2 è volutamente lento.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, argon2::password_hash::Error> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("password task failed: {e}");
            AppError::internal()
        })?
        .map_err(|e| {
            error!("password hashing error: {e}");
            AppError::internal()
        })
}

/// Handler per GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_BODY)
}

/// Handler per POST /auth/signup
pub async fn signup(
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> CreatedResult<TokenResponse> {
    // validazione prima di qualsiasi accesso al database
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request("Username and password are required."));
    }
    if req.username.chars().count() < 3 {
        return Err(AppError::bad_request("Username must be at least 3 chars."));
    }
    if req.password.chars().count() < 6 {
        return Err(AppError::bad_request("Password must be at least 6 chars."));
    }

    // controllo se lo username esiste già; check e insert non sono atomici
    if state.store.count_users_named(&req.username).await? > 0 {
        return Err(AppError::bad_request("User already exists."));
    }

    let password = req.password;
    let password_hash = blocking(move || auth::hash_password(&password)).await?;
    let user = state.store.create_user(&req.username, &password_hash).await?;
    let token = state.tokens.issue(user.id, &user.username)?;
    info!(user_id = user.id, "user signed up");

    let resp = Envelope::success("sign up success", Some(TokenResponse { token: Some(token) }));
    Ok((StatusCode::CREATED, Json(resp)))
}

/// Handler per POST /auth/signin
pub async fn signin(
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(req): JsonBody<SigninRequest>,
) -> ApiResult<TokenResponse> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request("Username and password are required."));
    }

    let record = state
        .store
        .find_user_by_username(&req.username)
        .await?
        .ok_or_else(|| AppError::bad_request(INVALID_CREDENTIALS))?;

    let password = req.password;
    let stored = record.password_hash.clone();
    if !blocking(move || auth::verify_password(&password, &stored)).await? {
        return Err(AppError::bad_request(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue(record.user.id, &record.user.username)?;
    info!(user_id = record.user.id, "user signed in");
    Ok(Json(Envelope::success("signin success", Some(TokenResponse { token: Some(token) }))))
}

/// Handler per GET /auth/me
pub async fn me(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> ApiResult<MeResponse> {
    // token valido ma utente cancellato nel frattempo: trattato come non autenticato
    let user = state
        .store
        .find_user_by_id(identity.id)
        .await?
        .ok_or_else(AppError::unauthorized)?;
    let notes = state.store.notes_for_user(user.id).await?;
    Ok(Json(Envelope::ok(MeResponse { user, notes })))
}

/// Handler per GET /auth/signout. I token sono stateless: il client scarta il suo.
pub async fn signout(AuthUser(_): AuthUser) -> Json<Envelope<TokenResponse>> {
    Json(Envelope::success("Signout success", Some(TokenResponse { token: None })))
}

/// Handler per GET /notes: tutte le note, senza autenticazione né filtro per utente.
pub async fn get_notes(Extension(state): Extension<Arc<AppState>>) -> ApiResult<NotesResponse> {
    let notes = state.store.list_notes().await?;
    Ok(Json(Envelope::ok(NotesResponse { notes })))
}

/// Handler per POST /notes
pub async fn add_note(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    JsonBody(req): JsonBody<CreateNoteRequest>,
) -> CreatedResult<NoteResponse> {
    if req.title.trim().is_empty() || req.content.trim().is_empty() {
        return Err(AppError::bad_request("All fields required"));
    }
    // come in /auth/me: token valido per un utente rimosso vale come non autenticato
    if state.store.find_user_by_id(identity.id).await?.is_none() {
        return Err(AppError::unauthorized());
    }
    let note = state.store.create_note(identity.id, &req.title, &req.content).await?;
    info!(user_id = identity.id, note_id = note.id, "note created");
    Ok((StatusCode::CREATED, Json(Envelope::ok(NoteResponse { note }))))
}

/// Handler per GET /notes/:id, solo note del chiamante
pub async fn get_note(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    NoteId(id): NoteId,
) -> ApiResult<NoteResponse> {
    let note = state
        .store
        .find_note_for_user(id, identity.id)
        .await?
        .ok_or_else(|| AppError::not_found("Note not found."))?;
    Ok(Json(Envelope::ok(NoteResponse { note })))
}

/// Handler per PATCH /notes/:id
pub async fn update_note(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    NoteId(id): NoteId,
    JsonBody(req): JsonBody<UpdateNoteRequest>,
) -> ApiResult<NoteResponse> {
    let title = req.title.as_deref().filter(|s| !s.trim().is_empty());
    let content = req.content.as_deref().filter(|s| !s.trim().is_empty());
    if title.is_none() && content.is_none() {
        return Err(AppError::bad_request("Nothing to update."));
    }
    let note = state
        .store
        .update_note_for_user(id, identity.id, title, content)
        .await?
        .ok_or_else(|| AppError::not_found("Note not found."))?;
    info!(user_id = identity.id, note_id = note.id, "note updated");
    Ok(Json(Envelope::ok(NoteResponse { note })))
}

/// Handler per DELETE /notes/:id
pub async fn delete_note(
    Extension(state): Extension<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    NoteId(id): NoteId,
) -> ApiResult<()> {
    if !state.store.delete_note_for_user(id, identity.id).await? {
        return Err(AppError::not_found("Note not found."));
    }
    info!(user_id = identity.id, note_id = id, "note deleted");
    Ok(Json(Envelope::success("Note deleted.", None)))
}
