//! Resource identifiers

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a primitive or of an entity held by one (a feed, a post, a
/// follow, a group).
///
/// Identifiers are `(namespace, sequence)` pairs handed out by an
/// [`IdGenerator`](crate::IdGenerator); the sequence starts at one, so the
/// all-zero value never names a real resource. That value is the legacy
/// wire encoding of "any resource" and is rejected on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "ResourceIdRepr")]
pub struct ResourceId {
    namespace: u64,
    sequence: u64,
}

#[derive(Deserialize)]
struct ResourceIdRepr {
    namespace: u64,
    sequence: u64,
}

impl TryFrom<ResourceIdRepr> for ResourceId {
    type Error = CoreError;

    fn try_from(repr: ResourceIdRepr) -> Result<Self> {
        Self::new(repr.namespace, repr.sequence)
    }
}

impl ResourceId {
    /// Create a resource identifier, rejecting the reserved zero sequence
    pub fn new(namespace: u64, sequence: u64) -> Result<Self> {
        if sequence == 0 {
            return Err(CoreError::invalid_query(format!(
                "sequence 0 in namespace {} is reserved for the wildcard sentinel",
                namespace
            )));
        }
        Ok(Self { namespace, sequence })
    }

    /// Decode a packed 128-bit identifier (namespace in the high half)
    pub fn from_raw(raw: u128) -> Result<Self> {
        Self::new((raw >> 64) as u64, raw as u64)
    }

    /// Pack into a 128-bit identifier
    pub fn to_raw(self) -> u128 {
        ((self.namespace as u128) << 64) | self.sequence as u128
    }

    /// Namespace this identifier was allocated in
    pub fn namespace(self) -> u64 {
        self.namespace
    }

    /// Position within the namespace (always non-zero)
    pub fn sequence(self) -> u64 {
        self.sequence
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.sequence)
    }
}
