//! Opaque key → value metadata attached to a primitive

use agora_core::DataKey;
use std::collections::HashMap;

/// Extra data store. Values are not interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraDataStore {
    entries: HashMap<DataKey, Vec<u8>>,
}

impl ExtraDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`. Returns true if a value was replaced.
    pub fn set(&mut self, key: DataKey, value: Vec<u8>) -> bool {
        self.entries.insert(key, value).is_some()
    }

    pub fn get(&self, key: &DataKey) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Remove `key`, returning its value if one was stored
    pub fn remove(&mut self, key: &DataKey) -> Option<Vec<u8>> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &DataKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
