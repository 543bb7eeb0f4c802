//! Access decision table
//!
//! A three-key table `(role, resource scope, permission scope)` holding a
//! tri-state decision. Entries never set read as `Undefined`; setting an entry
//! back to `Undefined` removes it.

use super::AccessDecision;
use crate::error::{AuthzError, Result};
use crate::scope::AccessKey;
use agora_core::RoleId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How an entry moved when it was set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessChange {
    /// Undefined to a defined decision
    Added,
    /// Defined to a (possibly identical) defined decision
    Updated,
    /// Defined to Undefined
    Removed,
}

impl AccessChange {
    /// Classify a transition. `Undefined` to `Undefined` is not a change and
    /// is rejected.
    pub fn classify(previous: AccessDecision, next: AccessDecision) -> Result<Self> {
        match (previous.is_defined(), next.is_defined()) {
            (false, false) => Err(AuthzError::AccessEntryInvalid(
                "entry is already undefined".to_string(),
            )),
            (false, true) => Ok(Self::Added),
            (true, false) => Ok(Self::Removed),
            (true, true) => Ok(Self::Updated),
        }
    }
}

/// Raw storage for access decisions
#[derive(Debug, Clone, Default)]
pub struct AccessDecisionStore {
    entries: HashMap<AccessKey, AccessDecision>,
}

impl AccessDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw read of one entry
    pub fn get(&self, key: &AccessKey) -> AccessDecision {
        self.entries.get(key).copied().unwrap_or_default()
    }

    /// Set an entry and report how it changed.
    ///
    /// Validation happens before the write: a rejected transition leaves the
    /// table untouched.
    pub fn set(&mut self, key: AccessKey, decision: AccessDecision) -> Result<AccessChange> {
        let change = AccessChange::classify(self.get(&key), decision)?;

        if decision.is_defined() {
            self.entries.insert(key, decision);
        } else {
            self.entries.remove(&key);
        }

        Ok(change)
    }

    /// All defined entries for a role
    pub fn entries_for(&self, role: RoleId) -> Vec<(AccessKey, AccessDecision)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .filter(|(key, _)| key.role == role)
            .map(|(key, decision)| (*key, *decision))
            .collect();
        entries.sort_by_key(|(key, _)| *key);
        entries
    }

    /// Number of defined entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{PermissionScope, ResourceScope};
    use agora_core::{PermissionId, ResourceId};

    fn key() -> AccessKey {
        AccessKey::new(
            RoleId::new(3),
            ResourceId::new(1, 1).unwrap(),
            PermissionId::from_name("agora.permission.SetRules"),
        )
    }

    #[test]
    fn test_unset_reads_undefined() {
        let store = AccessDecisionStore::new();
        assert_eq!(store.get(&key()), AccessDecision::Undefined);
    }

    #[test]
    fn test_transitions() {
        let mut store = AccessDecisionStore::new();

        assert!(matches!(
            store.set(key(), AccessDecision::Undefined),
            Err(AuthzError::AccessEntryInvalid(_))
        ));
        assert_eq!(
            store.set(key(), AccessDecision::Granted).unwrap(),
            AccessChange::Added
        );
        assert_eq!(
            store.set(key(), AccessDecision::Denied).unwrap(),
            AccessChange::Updated
        );
        assert_eq!(
            store.set(key(), AccessDecision::Denied).unwrap(),
            AccessChange::Updated
        );
        assert_eq!(
            store.set(key(), AccessDecision::Undefined).unwrap(),
            AccessChange::Removed
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_entries_for_role() {
        let mut store = AccessDecisionStore::new();
        store.set(key(), AccessDecision::Granted).unwrap();
        store
            .set(
                AccessKey::new(RoleId::new(3), ResourceScope::Any, PermissionScope::Any),
                AccessDecision::Denied,
            )
            .unwrap();
        store
            .set(
                AccessKey::new(RoleId::new(4), ResourceScope::Any, PermissionScope::Any),
                AccessDecision::Granted,
            )
            .unwrap();

        assert_eq!(store.entries_for(RoleId::new(3)).len(), 2);
        assert_eq!(store.entries_for(RoleId::new(4)).len(), 1);
        assert_eq!(store.len(), 3);
    }
}
