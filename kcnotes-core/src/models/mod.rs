pub mod claims;
pub mod note;
pub mod user;

// Re-export per comodità
pub use claims::Claims;
pub use note::Note;
pub use user::User;
