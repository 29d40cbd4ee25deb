use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreError;
use crate::models::StoreDocument;

/// Names a slot in a `SlotStore`. Today everything lives under `global()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey(String);

impl SlotKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn global() -> Self {
        Self::new("void")
    }
}

/// Holds at most one document per key. Writes replace wholesale with no
/// version check, so concurrent writers race and the last one wins.
pub trait SlotStore: Send + Sync {
    fn put(&self, key: &SlotKey, doc: StoreDocument) -> Result<(), StoreError>;
    fn get(&self, key: &SlotKey) -> Result<Option<StoreDocument>, StoreError>;
    fn clear(&self, key: &SlotKey) -> Result<(), StoreError>;
}

/// Process-memory slots; everything is gone on restart.
#[derive(Default)]
pub struct InMemorySlotStore {
    slots: RwLock<HashMap<SlotKey, StoreDocument>>,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for InMemorySlotStore {
    fn put(&self, key: &SlotKey, doc: StoreDocument) -> Result<(), StoreError> {
        let mut slots = self.slots.write().map_err(|_| StoreError::Poisoned)?;
        slots.insert(key.clone(), doc);
        Ok(())
    }

    fn get(&self, key: &SlotKey) -> Result<Option<StoreDocument>, StoreError> {
        let slots = self.slots.read().map_err(|_| StoreError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn clear(&self, key: &SlotKey) -> Result<(), StoreError> {
        let mut slots = self.slots.write().map_err(|_| StoreError::Poisoned)?;
        slots.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatternTable;

    fn doc(timestamp: i64) -> StoreDocument {
        StoreDocument {
            role: Some("sender".to_string()),
            patterns: PatternTable::new(),
            consciousness: Vec::new(),
            timestamp,
            last_update: "2026-10-16T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn last_write_wins() {
        let store = InMemorySlotStore::new();
        let key = SlotKey::global();
        store.put(&key, doc(1)).unwrap();
        store.put(&key, doc(2)).unwrap();
        assert_eq!(store.get(&key).unwrap().unwrap().timestamp, 2);
    }

    #[test]
    fn clear_empties_only_that_slot() {
        let store = InMemorySlotStore::new();
        let other = SlotKey::new("elsewhere");
        store.put(&SlotKey::global(), doc(1)).unwrap();
        store.put(&other, doc(5)).unwrap();

        store.clear(&SlotKey::global()).unwrap();
        assert!(store.get(&SlotKey::global()).unwrap().is_none());
        assert_eq!(store.get(&other).unwrap().unwrap().timestamp, 5);
    }
}
