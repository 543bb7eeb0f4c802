//! Namespaced identifier generation
//!
//! Every primitive instance owns an [`IdGenerator`] in a namespace handed out
//! by a shared [`IdAllocator`]. Identifiers are therefore unique across
//! instances without any dependence on network identity or hashing.

use crate::error::{CoreError, Result};
use crate::types::ResourceId;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out namespaces, one per primitive instance (or per entity kind
/// within an instance).
#[derive(Debug)]
pub struct IdAllocator {
    next_namespace: AtomicU64,
}

impl IdAllocator {
    /// Create an allocator whose first namespace is 1
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create an allocator starting at a given namespace, for deployments
    /// that partition the namespace space between processes
    pub fn starting_at(namespace: u64) -> Self {
        Self {
            next_namespace: AtomicU64::new(namespace),
        }
    }

    /// Reserve a fresh namespace and return a generator for it
    pub fn generator(&self) -> IdGenerator {
        IdGenerator::new(self.next_namespace.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic identifier source within one namespace.
///
/// Generators belong to a primitive's rollback snapshot: a vetoed action
/// leaves the counter where it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGenerator {
    namespace: u64,
    last: u64,
}

impl IdGenerator {
    /// Create a generator for a namespace
    pub fn new(namespace: u64) -> Self {
        Self { namespace, last: 0 }
    }

    /// Allocate the next identifier
    pub fn next_id(&mut self) -> Result<ResourceId> {
        let sequence = self.last.checked_add(1).ok_or_else(|| {
            CoreError::Exhausted(format!("namespace {} has no identifiers left", self.namespace))
        })?;
        let id = ResourceId::new(self.namespace, sequence)?;
        self.last = sequence;
        Ok(id)
    }

    /// Identifier the next call to [`next_id`](Self::next_id) would return
    pub fn peek(&self) -> Result<ResourceId> {
        self.clone().next_id()
    }

    /// Number of identifiers allocated so far
    pub fn allocated(&self) -> u64 {
        self.last
    }

    pub fn namespace(&self) -> u64 {
        self.namespace
    }
}
