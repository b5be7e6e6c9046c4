use thiserror::Error;

/// Failures of the key-value store and of backup files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed backup document: {0}")]
    MalformedImport(#[source] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejected operations on the active session. None of them change state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("no active session")]
    NoActiveSession,

    #[error("a session is already in progress (id: {0})")]
    AlreadyInProgress(String),

    #[error("name must not be blank")]
    BlankName,

    #[error("no exercise `{0}` in the active session")]
    ExerciseNotFound(String),

    #[error("no set `{0}` in that exercise")]
    SetNotFound(String),

    #[error("weight must be a finite, non-negative number (got {0})")]
    InvalidWeight(f64),
}
