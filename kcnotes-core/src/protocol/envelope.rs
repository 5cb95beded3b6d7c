use serde::{Deserialize, Serialize};

/// Messaggio di default per le risposte di successo.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Success";

/// Forma uniforme di ogni risposta JSON: `{ success, message, data }`.
///
/// `data` viene serializzato come `null` quando assente, anche negli errori,
/// così il client può sempre leggere gli stessi tre campi.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Successo con il messaggio di default.
    pub fn ok(data: T) -> Self {
        Self::success(DEFAULT_SUCCESS_MESSAGE, Some(data))
    }

    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    /// Envelope di errore: `data` è sempre `null`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}
