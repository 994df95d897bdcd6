/// Key/value "local storage" for the client.
///
/// Mirrors the browser `localStorage` surface (`getItem` / `setItem` /
/// `removeItem`) so the session layer reads the same way it would in a page.
///
/// [`FileStorage`] persists to `~/.nutriboard/local-storage.json` so a login
/// survives across short-lived `nutriboard` invocations and is shared with the
/// local web dashboard. Every call is a read-modify-write of the whole file;
/// a missing or malformed file reads as empty.
///
/// [`MemoryStorage`] keeps everything in-process.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};

/// The storage surface used by [`crate::session::Session`].
pub trait Storage: Send + Sync {
    /// Return the stored value for `key`, if any.
    fn get_item(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// File-backed storage
// ---------------------------------------------------------------------------

/// JSON-file storage.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Storage backed by an explicit file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Storage at the default location, `~/.nutriboard/local-storage.json`.
    pub fn open_default() -> Result<Self> {
        let path = default_storage_path().context("could not determine home directory")?;
        Ok(Self::new(path))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("failed to create storage directory")?;
        }
        let json = serde_json::to_string_pretty(map).context("failed to serialize storage")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().ok()?;
        self.read_map().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("storage lock poisoned"))?;
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("storage lock poisoned"))?;
        let mut map = self.read_map();
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

/// Default storage file: `~/.nutriboard/local-storage.json`.
pub fn default_storage_path() -> Option<PathBuf> {
    crate::config::state_dir().map(|dir| dir.join("local-storage.json"))
}

// ---------------------------------------------------------------------------
// In-memory storage
// ---------------------------------------------------------------------------

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .map_err(|_| anyhow::anyhow!("storage lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items
            .lock()
            .map_err(|_| anyhow::anyhow!("storage lock poisoned"))?
            .remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// A storage path inside a not-yet-created directory.
    fn temp_file(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("state").join("local-storage.json")
    }

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("token"), None);
        storage.set_item("token", "abc").unwrap();
        assert_eq!(storage.get_item("token").as_deref(), Some("abc"));
        storage.remove_item("token").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir);

        FileStorage::new(&path).set_item("token", "t-1").unwrap();
        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get_item("token").as_deref(), Some("t-1"));

        reopened.remove_item("token").unwrap();
        assert_eq!(FileStorage::new(&path).get_item("token"), None);
    }

    #[test]
    fn file_storage_treats_malformed_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get_item("token"), None);
        storage.set_item("token", "fresh").unwrap();
        assert_eq!(storage.get_item("token").as_deref(), Some("fresh"));
    }

    #[test]
    fn removing_missing_key_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir);
        let storage = FileStorage::new(&path);
        assert!(storage.remove_item("nothing").is_ok());
        assert!(!path.exists());
    }
}
