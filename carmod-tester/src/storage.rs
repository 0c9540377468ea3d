//! File-backed loadout store
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use carmod_game::store::decode_record;
use carmod_game::{Loadout, LoadoutStore, MemoryStore, StoreError};

/// Every save key in one JSON document on disk.
///
/// Each write rewrites the whole document through a temp file and a rename,
/// so a crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    records: Rc<RefCell<BTreeMap<String, String>>>,
}

impl FileStore {
    /// Open `path`, reading existing records if the file is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
                key: path.display().to_string(),
                source,
            })?
        } else {
            BTreeMap::new()
        };
        log::debug!("opened loadout file {} ({} records)", path.display(), records.len());
        Ok(Self {
            path,
            records: Rc::new(RefCell::new(records)),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `records` as the whole document. The temp file is removed when
    /// the write or the rename fails.
    fn persist(&self, records: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let document = serde_json::to_string_pretty(records).map_err(StoreError::Encode)?;
        let temp_path = self.path.with_extension("json.tmp");
        let written =
            fs::write(&temp_path, document).and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(err) = written {
            if temp_path.exists() {
                let _ = fs::remove_file(&temp_path);
            }
            log::warn!("failed to write loadout file {}: {err}", self.path.display());
            return Err(err.into());
        }
        Ok(())
    }

    /// Persist `next` and only then make it the live record set.
    fn commit(&self, next: BTreeMap<String, String>) -> Result<(), StoreError> {
        self.persist(&next)?;
        *self.records.borrow_mut() = next;
        Ok(())
    }
}

impl LoadoutStore for FileStore {
    fn save(&self, key: &str, loadout: &Loadout) -> Result<(), StoreError> {
        let encoded = loadout.to_json().map_err(StoreError::Encode)?;
        let mut next = self.records.borrow().clone();
        next.insert(key.to_string(), encoded);
        self.commit(next)
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
        if !self.contains(key) {
            return Ok(());
        }
        let mut next = self.records.borrow().clone();
        next.remove(key);
        self.commit(next)
    }
}

/// The store a scenario runs against, picked from the command line.
#[derive(Debug, Clone)]
pub enum TesterStore {
    Memory(MemoryStore),
    File(FileStore),
}

impl TesterStore {
    /// A fresh store for one scenario. With a directory, the scenario gets its
    /// own file there, truncated first.
    ///
    /// # Errors
    ///
    /// Returns an error if a stale scenario file cannot be removed.
    pub fn fresh(dir: Option<&Path>, scenario: &str) -> Result<Self, StoreError> {
        let Some(dir) = dir else {
            return Ok(Self::Memory(MemoryStore::new()));
        };
        let path = dir.join(format!("{scenario}.json"));
        if path.exists() {
            fs::remove_file(&path)?;
        }
        FileStore::open(path).map(Self::File)
    }

    /// Another handle on the same records, re-read from disk for files.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can no longer be read.
    pub fn reopen(&self) -> Result<Self, StoreError> {
        match self {
            Self::Memory(store) => Ok(Self::Memory(store.clone())),
            Self::File(store) => FileStore::open(store.path()).map(Self::File),
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::File(_) => "file",
        }
    }
}

impl LoadoutStore for TesterStore {
    fn save(&self, key: &str, loadout: &Loadout) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.save(key, loadout),
            Self::File(store) => store.save(key, loadout),
        }
    }

    fn load(&self, key: &str) -> Result<Loadout, StoreError> {
        match self {
            Self::Memory(store) => store.load(key),
            Self::File(store) => store.load(key),
        }
    }

    fn contains(&self, key: &str) -> bool {
        match self {
            Self::Memory(store) => store.contains(key),
            Self::File(store) => store.contains(key),
        }
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.delete(key),
            Self::File(store) => store.delete(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "carmod-store-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn records_survive_reopen() {
        let path = temp_dir("reopen").join("loadouts.json");
        let loadout = Loadout {
            engine_level: 4,
            wheel: 1,
            ..Loadout::default()
        };
        {
            let store = FileStore::open(&path).expect("open new store");
            store.save("car1", &loadout).expect("save");
        }
        let reopened = FileStore::open(&path).expect("reopen store");
        assert!(reopened.contains("car1"));
        assert_eq!(reopened.load("car1").expect("load"), loadout);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn delete_removes_record_on_disk() {
        let path = temp_dir("delete").join("loadouts.json");
        let store = FileStore::open(&path).expect("open");
        store.save("car1", &Loadout::default()).expect("save");
        store.delete("car1").expect("delete");
        store.delete("car1").expect("deleting twice is fine");
        let reopened = FileStore::open(&path).expect("reopen");
        assert!(!reopened.contains("car1"));
    }

    #[test]
    fn unreadable_document_is_a_decode_error() {
        let dir = temp_dir("corrupt");
        fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("loadouts.json");
        fs::write(&path, "not json").expect("write");
        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Decode { .. })
        ));
    }

    #[test]
    fn fresh_file_store_starts_empty() {
        let dir = temp_dir("fresh");
        let first = TesterStore::fresh(Some(&dir), "smoke").expect("fresh");
        first.save("car1", &Loadout::default()).expect("save");
        let second = TesterStore::fresh(Some(&dir), "smoke").expect("fresh again");
        assert_eq!(second.label(), "file");
        assert!(!second.contains("car1"));
        assert_eq!(TesterStore::fresh(None, "smoke").expect("memory").label(), "memory");
    }

    /// Replace the document with a non-empty directory so the rename fails.
    fn block_document(path: &Path) {
        fs::remove_file(path).expect("remove document");
        fs::create_dir_all(path.join("occupied")).expect("block document");
    }

    #[test]
    fn failed_save_keeps_previous_record() {
        let path = temp_dir("failed-save").join("loadouts.json");
        let store = FileStore::open(&path).expect("open");
        let first = Loadout {
            engine_level: 1,
            ..Loadout::default()
        };
        store.save("car1", &first).expect("first save");
        block_document(&path);

        let second = Loadout {
            engine_level: 4,
            ..Loadout::default()
        };
        assert!(store.save("car1", &second).is_err());
        assert_eq!(store.load("car1").expect("load").engine_level, 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn failed_delete_keeps_record() {
        let path = temp_dir("failed-delete").join("loadouts.json");
        let store = FileStore::open(&path).expect("open");
        store.save("car1", &Loadout::default()).expect("save");
        block_document(&path);

        assert!(store.delete("car1").is_err());
        assert!(store.contains("car1"));
        assert!(!path.with_extension("json.tmp").exists());
    }
}
