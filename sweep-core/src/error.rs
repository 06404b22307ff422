use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    /// Caller supplied something unusable; nothing was written.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Content source or progress store is unreachable or refused the
    /// operation.
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Optimistic write lost against a newer revision.
    #[error("Revision conflict on {key}: expected {expected}, found {found}")]
    Conflict {
        key: String,
        expected: u64,
        found: u64,
    },

    #[error("No scan is currently processing")]
    NoActiveScan,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SweepError {
    /// Failures of the backing stores, as opposed to caller mistakes.
    pub fn is_storage(&self) -> bool {
        match self {
            SweepError::Storage(_) => true,
            #[cfg(feature = "database")]
            SweepError::Database(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
