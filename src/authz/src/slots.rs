//! "Many registered, at most one default" bookkeeping
//!
//! Invariant: a held default is always a member of the registered set.

use crate::error::{AuthzError, Result};
use std::collections::BTreeSet;
use tracing::debug;

/// Registered resources of one kind plus an optional default among them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultSlot<R: Ord + Copy> {
    registered: BTreeSet<R>,
    default: Option<R>,
}

impl<R: Ord + Copy + std::fmt::Debug> DefaultSlot<R> {
    pub fn new() -> Self {
        Self {
            registered: BTreeSet::new(),
            default: None,
        }
    }

    /// Add `resource` to the registered set. Returns false if it was
    /// already registered.
    pub fn register(&mut self, resource: R) -> bool {
        self.registered.insert(resource)
    }

    /// Change the default.
    ///
    /// `Some(resource)` registers it and evicts a different previous default
    /// from the registered set. `None` clears the default and fails with
    /// `DefaultSlotInvalid` when there is none to clear.
    ///
    /// Returns the previous default; `Some` means the change was an update
    /// (or removal) rather than an addition.
    pub fn set_default(&mut self, resource: Option<R>) -> Result<Option<R>> {
        let previous = self.default;
        match resource {
            Some(resource) => {
                if let Some(old) = previous.filter(|old| *old != resource) {
                    self.registered.remove(&old);
                    debug!("Evicted previous default {:?}", old);
                }
                self.registered.insert(resource);
                self.default = Some(resource);
            }
            None => {
                if previous.is_none() {
                    return Err(AuthzError::DefaultSlotInvalid("no default is set".to_string()));
                }
                self.default = None;
            }
        }
        Ok(previous)
    }

    /// Remove `resource` from the registered set, clearing the default first
    /// if it was the default. Returns whether it was registered.
    pub fn remove(&mut self, resource: R) -> bool {
        if self.default == Some(resource) {
            self.default = None;
        }
        self.registered.remove(&resource)
    }

    pub fn current_default(&self) -> Option<R> {
        self.default
    }

    pub fn is_registered(&self, resource: R) -> bool {
        self.registered.contains(&resource)
    }

    /// Registered resources in ascending order
    pub fn registered(&self) -> Vec<R> {
        self.registered.iter().copied().collect()
    }
}

impl<R: Ord + Copy + std::fmt::Debug> Default for DefaultSlot<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::ResourceId;
    use proptest::prelude::*;

    fn res(seq: u64) -> ResourceId {
        ResourceId::new(7, seq).unwrap()
    }

    #[test]
    fn test_default_lifecycle() {
        let (a, b) = (res(1), res(2));
        let mut slot = DefaultSlot::new();

        assert_eq!(slot.set_default(Some(a)).unwrap(), None);
        assert_eq!(slot.current_default(), Some(a));

        assert_eq!(slot.set_default(Some(b)).unwrap(), Some(a));
        assert!(!slot.is_registered(a));
        assert_eq!(slot.registered(), vec![b]);

        assert_eq!(slot.set_default(None).unwrap(), Some(b));
        assert_eq!(slot.current_default(), None);
        assert!(slot.is_registered(b));

        assert!(matches!(
            slot.set_default(None),
            Err(AuthzError::DefaultSlotInvalid(_))
        ));
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut slot = DefaultSlot::new();
        assert!(slot.register(res(1)));
        assert!(!slot.register(res(1)));
        assert_eq!(slot.registered().len(), 1);
    }

    #[test]
    fn test_setting_same_default_keeps_it_registered() {
        let mut slot = DefaultSlot::new();
        slot.set_default(Some(res(1))).unwrap();
        assert_eq!(slot.set_default(Some(res(1))).unwrap(), Some(res(1)));
        assert!(slot.is_registered(res(1)));
    }

    #[test]
    fn test_remove_default_clears_it() {
        let mut slot = DefaultSlot::new();
        slot.register(res(1));
        slot.set_default(Some(res(2))).unwrap();

        assert!(slot.remove(res(2)));
        assert_eq!(slot.current_default(), None);
        assert_eq!(slot.registered(), vec![res(1)]);
        assert!(!slot.remove(res(2)));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Register(u64),
        SetDefault(Option<u64>),
        Remove(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1u64..6).prop_map(Op::Register),
            proptest::option::of(1u64..6).prop_map(Op::SetDefault),
            (1u64..6).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn prop_default_is_always_registered(ops in proptest::collection::vec(op(), 0..40)) {
            let mut slot = DefaultSlot::new();
            for op in ops {
                match op {
                    Op::Register(n) => { slot.register(res(n)); }
                    Op::SetDefault(n) => { let _ = slot.set_default(n.map(res)); }
                    Op::Remove(n) => { slot.remove(res(n)); }
                }
                if let Some(current) = slot.current_default() {
                    prop_assert!(slot.is_registered(current));
                }
            }
        }
    }
}
