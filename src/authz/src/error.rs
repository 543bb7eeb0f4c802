//! Error types for the authorization core

use agora_core::CoreError;
use thiserror::Error;

/// Authorization core errors.
///
/// Every error aborts the enclosing operation; nothing is retried here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// The resolver refused the caller at the gate
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// A wildcard sentinel was passed where a concrete identifier is required
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Duplicate grant, revoke of an unassigned role, owner role through a
    /// generic path, or an unauthorized caller
    #[error("Invalid role operation: {0}")]
    RoleOperationInvalid(String),

    /// Setting an undefined entry to undefined
    #[error("Invalid access entry: {0}")]
    AccessEntryInvalid(String),

    /// An extension module vetoed the action
    #[error("Rule '{rule}' rejected {action}: {reason}")]
    RuleRejected {
        rule: String,
        action: String,
        reason: String,
    },

    /// The action needs an extension module and none is configured
    #[error("Missing extension module: {0}")]
    MissingExtensionModule(String),

    /// Unsetting an already-empty default slot
    #[error("Invalid default slot operation: {0}")]
    DefaultSlotInvalid(String),

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Identifier layer error
    #[error("Core error: {0}")]
    Core(CoreError),
}

impl From<CoreError> for AuthzError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidQuery(msg) => AuthzError::InvalidQuery(msg),
            other => AuthzError::Core(other),
        }
    }
}

impl From<serde_json::Error> for AuthzError {
    fn from(err: serde_json::Error) -> Self {
        AuthzError::Serialization(err.to_string())
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
