/// Categorie di errore esposte sul wire. Ogni errore del server ricade in una di queste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input malformato o non valido, risorsa duplicata
    BadRequest,
    /// Credenziali mancanti, non valide o scadute
    Unauthorized,
    /// Nessuna rotta o risorsa corrispondente
    NotFound,
    /// Errore inatteso di persistenza o runtime
    Internal,
}

impl ErrorKind {
    /// HTTP status code associato.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::NotFound => 404,
            ErrorKind::Internal => 500,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request.",
            ErrorKind::Unauthorized => "Unauthorized.",
            ErrorKind::NotFound => "Not found.",
            ErrorKind::Internal => "Internal server error.",
        }
    }
}
