//! Error types shared by the identifier layer

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for identifier construction and parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A reserved wildcard sentinel was used where a concrete identifier is required
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Malformed identifier or input
    #[error("Invalid: {0}")]
    Invalid(String),

    /// Identifier space exhausted
    #[error("Exhausted: {0}")]
    Exhausted(String),
}

impl CoreError {
    /// Create an invalid query error
    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        CoreError::InvalidQuery(msg.into())
    }

    /// Create an invalid error
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        CoreError::Invalid(msg.into())
    }
}
