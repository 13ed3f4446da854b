//! Error types for find/replace operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FindReplaceError {
    /// A malformed search or replacement pattern. Carries the engine's diagnostic.
    #[error("{0}")]
    InvalidPattern(String),

    #[error("The target is read-only")]
    ReadOnlyTarget,

    #[error("No find/replace target attached")]
    NoTarget,

    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<regex_lite::Error> for FindReplaceError {
    fn from(err: regex_lite::Error) -> Self {
        FindReplaceError::InvalidPattern(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FindReplaceError>;
