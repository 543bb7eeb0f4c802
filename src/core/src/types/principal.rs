//! Principal identity

use serde::{Deserialize, Serialize};
use std::fmt;

/// An identity that can hold roles and act on primitives
/// (e.g., "account:alice", "app:photos").
///
/// Principals carry no state of their own; they are lookup keys. The empty
/// principal stands for "no account" and is rejected wherever an account is
/// required.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Create a principal from an identifier string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The absent principal
    pub fn absent() -> Self {
        Self(String::new())
    }

    /// Whether this is the absent principal
    pub fn is_absent(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Get the identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_absent() {
            write!(f, "<absent>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Principal {
    fn from(id: String) -> Self {
        Self(id)
    }
}
