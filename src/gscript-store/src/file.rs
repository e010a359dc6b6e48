//! File-backed property store
//!
//! The whole store is one JSON object of string values. It is loaded when
//! opened and rewritten after every mutation: the new contents go to a
//! sibling temp file which is then renamed over the original. The in-memory
//! view only changes once that write has succeeded.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;
use log::debug;

use crate::{PropertyStore, Result, StoreError};

/// Property store persisted as a JSON file
#[derive(Debug)]
pub struct FilePropertyStore {
    path: PathBuf,
    entries: Mutex<IndexMap<String, String>>,
}

impl FilePropertyStore {
    /// Open the store at `path`, starting empty if the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                IndexMap::new()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            IndexMap::new()
        };
        debug!(
            "Opened property store {} ({} entries)",
            path.display(),
            entries.len()
        );
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, IndexMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn persist(&self, entries: &IndexMap<String, String>) -> Result<()> {
        let text = serde_json::to_string_pretty(entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, text)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PropertyStore for FilePropertyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock()?;
        let mut staged = entries.clone();
        staged.insert(key.to_string(), value.to_string());
        self.persist(&staged)?;
        *entries = staged;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.lock()?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut staged = entries.clone();
        staged.shift_remove(key);
        self.persist(&staged)?;
        *entries = staged;
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("props.json");

        let store = FilePropertyStore::open(&path).unwrap();
        store.set("script.function.a", "function() { return 1 }").unwrap();
        store.set("other", "x").unwrap();
        store.remove("other").unwrap();
        drop(store);

        let reopened = FilePropertyStore::open(&path).unwrap();
        assert_eq!(reopened.keys().unwrap(), vec!["script.function.a"]);
        assert_eq!(
            reopened.get("script.function.a").unwrap().as_deref(),
            Some("function() { return 1 }")
        );
        assert!(!dir.path().join("props.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("props.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            FilePropertyStore::open(&path),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn test_missing_directory_surfaces_io_error() {
        let dir = TempDir::new().unwrap();
        let store = FilePropertyStore::open(dir.path().join("nope/props.json")).unwrap();
        assert!(matches!(store.set("k", "v"), Err(StoreError::Io(_))));
    }

    #[test]
    fn test_failed_write_leaves_entries_unchanged() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("data");
        fs::create_dir(&sub).unwrap();
        let store = FilePropertyStore::open(sub.join("props.json")).unwrap();
        store.set("kept", "1").unwrap();

        fs::remove_dir_all(&sub).unwrap();

        assert!(matches!(store.set("added", "2"), Err(StoreError::Io(_))));
        assert_eq!(store.get("added").unwrap(), None);
        assert_eq!(store.keys().unwrap(), vec!["kept"]);

        assert!(matches!(store.remove("kept"), Err(StoreError::Io(_))));
        assert_eq!(store.get("kept").unwrap().as_deref(), Some("1"));
    }
}
