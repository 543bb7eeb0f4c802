//! Role identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque numeric role identifier.
///
/// `RoleId::OWNER` is reserved: it is assigned once when an access control
/// instance is created and only moves through an explicit ownership transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(u64);

impl RoleId {
    /// The reserved owner role
    pub const OWNER: RoleId = RoleId(0);

    /// Create a role identifier from a raw value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Derive a role identifier from a stable role name.
    ///
    /// The first eight bytes of the blake3 digest of the name, so that every
    /// deployment agrees on the identifier. The owner value is never produced.
    pub fn from_name(name: &str) -> Self {
        let digest = blake3::hash(name.as_bytes());
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&digest.as_bytes()[..8]);
        match u64::from_be_bytes(raw) {
            0 => Self(1),
            value => Self(value),
        }
    }

    /// Get the raw value
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this is the reserved owner role
    pub const fn is_owner(self) -> bool {
        self.0 == Self::OWNER.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_owner() {
            write!(f, "role:owner")
        } else {
            write!(f, "role:{:#x}", self.0)
        }
    }
}
