//! kcnotes-core: tipi condivisi tra client e server (modelli, DTO HTTP, envelope di risposta, errori).
//! Niente I/O: il crate server si occupa di database, token e HTTP.

pub mod error;
pub mod models;
pub mod protocol;
pub mod utils;

// Re-export utili per ridurre i percorsi nel crate server
pub use error::ErrorKind;
pub use models::{claims::Claims, note::Note, user::User};
pub use protocol::envelope::Envelope;
pub use protocol::http::{
    CreateNoteRequest, MeResponse, NoteResponse, NotesResponse, SigninRequest, SignupRequest,
    TokenResponse, UpdateNoteRequest,
};
pub use utils::{now_timestamp, unix_now};
