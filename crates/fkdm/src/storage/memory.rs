//! In-memory slot store.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::Result;

use super::{check_quota, slot_size, SlotStore};

/// Slot store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<BTreeMap<String, String>>,
    quota: Option<u64>,
}

impl MemoryStore {
    /// Create an empty store with no quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects writes past `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: u64) -> Self {
        Self {
            slots: RefCell::default(),
            quota: Some(quota),
        }
    }
}

impl SlotStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let others: u64 = self
            .slots
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| slot_size(k, v))
            .sum();
        check_quota(key, others + slot_size(key, value), self.quota)?;

        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }

    fn used_bytes(&self) -> Result<u64> {
        Ok(self
            .slots
            .borrow()
            .iter()
            .map(|(k, v)| slot_size(k, v))
            .sum())
    }

    fn quota(&self) -> Option<u64> {
        self.quota
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_roundtrip_and_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.read("a").unwrap(), None);

        store.write("a", "1").unwrap();
        assert_eq!(store.read("a").unwrap().as_deref(), Some("1"));

        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert_eq!(store.read("a").unwrap(), None);
    }

    #[test]
    fn test_quota_counts_other_slots() {
        let store = MemoryStore::with_quota(8);
        store.write("a", "123").unwrap();

        let err = store.write("b", "12345").unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { needed: 10, .. }));
        assert_eq!(store.read("b").unwrap(), None);
        assert_eq!(store.used_bytes().unwrap(), 4);
    }
}
