use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use fleetread_core::KeyValueStore;
use log::warn;

/// Settings store backed by one JSON object file. Mutations write through;
/// a failed write downgrades to a warning so the session keeps running.
pub struct FileStore {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store, probing that the backing path is writable. Callers
    /// fall back to an in-memory store on error.
    pub fn open(path: &Path) -> io::Result<Self> {
        let items = match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(
                    "storage: {} unreadable ({err}); starting fresh",
                    path.display()
                );
                BTreeMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err),
        };

        let store = Self {
            path: path.to_path_buf(),
            items,
        };
        store.write_out()?;
        Ok(store)
    }

    fn write_out(&self) -> io::Result<()> {
        let raw = serde_json::to_string_pretty(&self.items).map_err(io::Error::other)?;
        fs::write(&self.path, raw)
    }

    fn persist(&self) {
        if let Err(err) = self.write_out() {
            warn!("storage: failed to write {}: {err}", self.path.display());
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        self.items.remove(key);
        self.persist();
    }

    fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    fn key(&self, index: usize) -> Option<String> {
        self.items.keys().nth(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fleetread-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn values_survive_reopen() {
        let path = scratch_path("reopen");
        {
            let mut store = FileStore::open(&path).unwrap();
            store.set("settings", "{\"wordsPerMinute\":300}");
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(
            store.get("settings").as_deref(),
            Some("{\"wordsPerMinute\":300}")
        );
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unreadable_file_starts_fresh() {
        let path = scratch_path("corrupt");
        fs::write(&path, "not json").unwrap();
        let store = FileStore::open(&path).unwrap();
        assert!(store.is_empty());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn unwritable_path_errors_for_fallback() {
        let path = std::env::temp_dir().join("fleetread-missing-dir/deep/settings.json");
        assert!(FileStore::open(&path).is_err());
    }
}
