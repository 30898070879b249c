//! Key-value persistence for the settings record.

use std::collections::BTreeMap;

use log::warn;

use crate::settings::Settings;

pub const SETTINGS_KEY: &str = "settings";

/// String key-value store contract shared by all settings backends.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
    fn clear(&mut self);
    /// Key at `index` in iteration order, if any.
    fn key(&self, index: usize) -> Option<String>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory fallback used when no persistent backend is available.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.items.remove(key);
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn key(&self, index: usize) -> Option<String> {
        self.items.keys().nth(index).cloned()
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Load the persisted settings record. A missing or unreadable record is
/// reported as `None` so defaults apply.
pub fn load_settings(store: &dyn KeyValueStore) -> Option<Settings> {
    let raw = store.get(SETTINGS_KEY)?;
    match serde_json::from_str(&raw) {
        Ok(settings) => Some(settings),
        Err(err) => {
            warn!("storage: stored settings unreadable: {err}");
            None
        }
    }
}

/// Serialize the settings record into the store.
pub fn save_settings(
    store: &mut dyn KeyValueStore,
    settings: &Settings,
) -> Result<(), serde_json::Error> {
    let raw = serde_json::to_string(settings)?;
    store.set(SETTINGS_KEY, &raw);
    Ok(())
}
