use thiserror::Error;

/// Unified error taxonomy for the content stores.
///
/// `Validation`, `NotFound` and `Upload` are recoverable and surfaced to the
/// admin as a message; nothing is mutated when they occur. `Csrf` is surfaced
/// as "session expired" and aborts before any store call. `Persistence` means
/// the storage engine failed; the enclosing transaction is rolled back.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("session expired")]
    Csrf,

    #[error("storage failure: {0}")]
    Persistence(String),
}

pub type ContentResult<T> = Result<T, ContentError>;

impl ContentError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ContentError::Validation(msg.into())
    }

    /// Message shown to the admin. Persistence details stay in the log.
    pub fn user_message(&self) -> String {
        match self {
            ContentError::Persistence(_) => "Something went wrong. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<rusqlite::Error> for ContentError {
    fn from(e: rusqlite::Error) -> Self {
        ContentError::Persistence(e.to_string())
    }
}

impl From<r2d2::Error> for ContentError {
    fn from(e: r2d2::Error) -> Self {
        ContentError::Persistence(e.to_string())
    }
}
