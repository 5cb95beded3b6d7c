pub mod envelope;
pub mod http;

// Re-export comodi
pub use envelope::Envelope;
pub use http::{
    CreateNoteRequest, MeResponse, NoteResponse, NotesResponse, SigninRequest, SignupRequest,
    TokenResponse, UpdateNoteRequest,
};
