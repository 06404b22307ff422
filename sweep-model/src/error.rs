use std::fmt::{self, Display};

/// Errors produced by model constructors and parsing routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidContentType(String),
    UnknownStatus(String),
    UnknownKind(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidContentType(name) => {
                write!(f, "invalid content type name: {name:?}")
            }
            ModelError::UnknownStatus(raw) => {
                write!(f, "unknown item status: {raw}")
            }
            ModelError::UnknownKind(raw) => {
                write!(f, "unknown content kind: {raw}")
            }
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
