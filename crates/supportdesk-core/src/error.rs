use thiserror::Error;

/// A convenience `Result` alias using [`SupportError`].
pub type SupportResult<T> = Result<T, SupportError>;

/// Top-level error type for supportdesk.
///
/// Lookups that miss report `Ok(None)`; only operations that cannot proceed
/// without the session (such as appending a turn) use
/// [`SupportError::SessionNotFound`].
#[derive(Error, Debug)]
pub enum SupportError {
    /// The session is absent from both the cache and the document store.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// A document store operation failed.
    #[error("Store error: {0}")]
    Store(String),

    /// The text completion service failed.
    #[error("Completion error: {0}")]
    Completion(String),

    /// Invalid or unreadable configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SupportError {
    /// Wraps any displayable failure as a [`SupportError::Store`].
    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::Store(err.to_string())
    }
}
