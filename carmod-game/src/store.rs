//! Loadout persistence
//!
//! Loadouts are kept as serialized strings under a save key, the same way a
//! player-preferences store would hold them. Platform crates provide their own
//! [`LoadoutStore`]; [`MemoryStore`] covers tests and headless runs.
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::StoreError;
use crate::loadout::Loadout;

/// Key/value persistence for loadouts.
///
/// Implementations are cheap handles onto shared storage: cloning a store
/// must yield another view of the same records.
pub trait LoadoutStore {
    /// Write `loadout` under `key`, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    fn save(&self, key: &str, loadout: &Loadout) -> Result<(), StoreError>;

    /// Read the record under `key`, or a default loadout when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a record exists but cannot be read or decoded.
    fn load(&self, key: &str) -> Result<Loadout, StoreError>;

    /// Whether a record exists under `key`.
    fn contains(&self, key: &str) -> bool;

    /// Remove the record under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be updated.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local store holding encoded loadouts in a shared map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored string for `key`, as another platform would see it.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.records.borrow().get(key).cloned()
    }

    /// Overwrite the raw string under `key` without validation.
    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl LoadoutStore for MemoryStore {
    fn save(&self, key: &str, loadout: &Loadout) -> Result<(), StoreError> {
        let encoded = loadout.to_json().map_err(StoreError::Encode)?;
        self.records.borrow_mut().insert(key.to_string(), encoded);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Loadout, StoreError> {
        match self.records.borrow().get(key) {
            Some(encoded) => decode_record(key, encoded),
            None => Ok(Loadout::default()),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.records.borrow().contains_key(key)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.records.borrow_mut().remove(key);
        Ok(())
    }
}

/// Decode a stored string, attributing failures to `key`.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] when `encoded` is not a loadout document.
pub fn decode_record(key: &str, encoded: &str) -> Result<Loadout, StoreError> {
    Loadout::from_json(encoded).map_err(|source| StoreError::Decode {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    #[test]
    fn missing_key_loads_default() {
        let store = MemoryStore::new();
        assert!(!store.contains("car1"));
        assert_eq!(store.load("car1").unwrap(), Loadout::default());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let store = MemoryStore::new();
        let loadout = Loadout {
            paint: Rgba::rgb(0.1, 0.2, 0.3),
            wheel: 1,
            engine_level: 4,
            ..Loadout::default()
        };
        store.save("car1", &loadout).unwrap();
        assert!(store.contains("car1"));
        assert_eq!(store.load("car1").unwrap(), loadout);
    }

    #[test]
    fn clones_share_records() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.save("shared", &Loadout::default()).unwrap();
        assert!(other.contains("shared"));
        other.delete("shared").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_record_reports_key() {
        let store = MemoryStore::new();
        store.insert_raw("broken", "{not json");
        let err = store.load("broken").unwrap_err();
        assert!(matches!(err, StoreError::Decode { ref key, .. } if key == "broken"));
    }

    #[test]
    fn last_write_wins_for_shared_key() {
        let store = MemoryStore::new();
        let first = Loadout {
            siren: 0,
            ..Loadout::default()
        };
        let second = Loadout {
            siren: 1,
            ..Loadout::default()
        };
        store.save("dup", &first).unwrap();
        store.save("dup", &second).unwrap();
        assert_eq!(store.load("dup").unwrap().siren, 1);
        assert_eq!(store.len(), 1);
    }
}
